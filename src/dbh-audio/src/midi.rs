//! MIDI track extraction
//!
//! Raw MIDI records have a fixed prefix:
//!
//! ```text
//! +0   "QZIP\0RAW_FILE"   record marker (13 bytes)
//! +13  12 bytes           record header (not interpreted)
//! +25  "MIDI"             payload type
//! +29  4 bytes            payload size (not interpreted)
//! +33  "MThd" ...         standard MIDI file, until the terminator
//! ```
//!
//! The track name comes from the first track chunk's meta events.

use crate::boundary::{find_terminator, slice_to_terminator};
use crate::output::sanitize_file_name;
use crate::report::{Attempt, Skip, SkipReason};
use crate::scan::{find_from, scan};
use crate::session::CancelToken;
use crate::signature::{MIDI, MIDI_NAME_WINDOW, MIDI_RAW_FILE, MTHD, MTRK};
use crate::Result;

/// Bytes between the end of the record marker and the `MIDI` magic
pub const MIDI_MAGIC_GAP: usize = 12;

/// Bytes between the end of the `MIDI` magic and `MThd`
pub const MTHD_GAP: usize = 4;

const META_EVENT: u8 = 0xFF;
const META_TRACK_NAME: u8 = 0x03;
const META_TEXT: u8 = 0x01;
const META_TEXT_LAST: u8 = 0x0F;

/// A MIDI file carved out of a volume, starting at `MThd`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidiAsset<'a> {
    pub name: String,
    /// Name is `UnknownMidi_<n>` because no usable meta event was found
    pub fallback_name: bool,
    /// Offset of the record marker in the volume
    pub offset: usize,
    pub bytes: &'a [u8],
}

/// Synthetic name for the `count`-th unnamed track
pub fn fallback_name(count: usize) -> String {
    format!("UnknownMidi_{count}")
}

/// Printable ASCII only, then file-name safe
fn clean_name(bytes: &[u8]) -> String {
    let printable: String = bytes
        .iter()
        .filter(|b| (0x20..=0x7E).contains(*b))
        .map(|&b| char::from(b))
        .collect();
    sanitize_file_name(&printable)
}

/// `[0xFF][type][len][len bytes]` at `pos`, if it fits in `events`
fn meta_event(events: &[u8], pos: usize) -> Option<(u8, &[u8])> {
    if *events.get(pos)? != META_EVENT {
        return None;
    }
    let kind = *events.get(pos + 1)?;
    let len = usize::from(*events.get(pos + 2)?);
    let payload = events.get(pos + 3..pos + 3 + len)?;
    Some((kind, payload))
}

/// Find a track name in the meta events at the start of `events`.
///
/// Text and track-name events are preferred; any other text-class meta
/// event is accepted if it is long enough and contains a letter.
pub fn find_track_name(events: &[u8]) -> Option<String> {
    let window = events.len().min(MIDI_NAME_WINDOW);

    let strict = (0..window).find_map(|pos| {
        let (kind, payload) = meta_event(events, pos)?;
        if kind != META_TEXT && kind != META_TRACK_NAME {
            return None;
        }
        let name = clean_name(payload);
        (name.len() > 2).then_some(name)
    });
    if strict.is_some() {
        return strict;
    }

    (0..window).find_map(|pos| {
        let (kind, payload) = meta_event(events, pos)?;
        if !(META_TEXT..=META_TEXT_LAST).contains(&kind) || payload.len() <= 5 {
            return None;
        }
        if !payload.iter().any(u8::is_ascii_alphabetic) {
            return None;
        }
        let name = clean_name(payload);
        (name.len() > 5 && name.bytes().any(|b| b.is_ascii_alphabetic())).then_some(name)
    })
}

/// Verify the fixed record layout and return the `MThd` offset
fn locate_header(data: &[u8], offset: usize) -> Attempt<usize> {
    let midi = offset + MIDI_RAW_FILE.len() + MIDI_MAGIC_GAP;
    if !MIDI.matches_at(data, midi) {
        return Err(Skip::new(offset, SkipReason::MissingMidiMagic));
    }

    let mthd = midi + MIDI.len() + MTHD_GAP;
    if !MTHD.matches_at(data, mthd) {
        return Err(Skip::new(offset, SkipReason::MissingMidiHeader));
    }

    Ok(mthd)
}

fn track_name(data: &[u8], mthd: usize) -> Option<String> {
    let end = find_terminator(data, mthd);
    let mtrk = find_from(&data[..end], MTRK.bytes, mthd)?;
    find_track_name(&data[mtrk + MTRK.len()..end])
}

/// Carve every MIDI file out of `data`
pub fn extract_midi<'a>(
    data: &'a [u8],
    cancel: &CancelToken,
) -> Result<Vec<Attempt<MidiAsset<'a>>>> {
    let mut attempts = Vec::new();
    let mut unnamed = 0;

    for offset in scan(data, MIDI_RAW_FILE.bytes)? {
        if cancel.is_cancelled() {
            break;
        }

        let attempt = locate_header(data, offset).and_then(|mthd| {
            let bytes = slice_to_terminator(data, mthd)
                .ok_or(Skip::new(offset, SkipReason::EmptyRange))?;

            let (name, fallback) = match track_name(data, mthd) {
                Some(name) => (name, false),
                None => {
                    unnamed += 1;
                    (fallback_name(unnamed - 1), true)
                }
            };

            Ok(MidiAsset {
                name,
                fallback_name: fallback,
                offset,
                bytes,
            })
        });

        attempts.push(attempt);
    }

    Ok(attempts)
}
