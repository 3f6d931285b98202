//! Length-prefixed name records
//!
//! A bank name record is `[marker][?]...[u8][i32 len][bytes][i32 len][bytes]`
//! with no fixed distance between the marker and the first length field. The
//! reader walks forward in probes of one skipped byte plus a 4-byte length
//! until a plausible length decodes to text. The true name is usually the
//! second of two adjacent fields, so a short lookahead may supersede the
//! first candidate.

use byteorder::{ByteOrder, LE};

use crate::signature::{MAX_NAME_LENGTH, NAME_LOOKAHEAD_PROBES};

#[inline]
fn read_i32(data: &[u8], pos: usize) -> Option<i32> {
    data.get(pos..pos.checked_add(4)?).map(LE::read_i32)
}

#[inline]
fn plausible_length(raw: i32) -> Option<usize> {
    (1..=MAX_NAME_LENGTH)
        .contains(&raw)
        .then_some(raw as usize)
}

/// Decode a name field; invalid UTF-8 is no match.
///
/// NUL padding is kept: an all-NUL field is still a candidate, so the
/// lookahead runs past it. File names drop the NULs later.
fn decode(bytes: &[u8]) -> Option<String> {
    let text = std::str::from_utf8(bytes).ok()?;
    (!text.is_empty()).then(|| text.to_string())
}

/// Probe up to [`NAME_LOOKAHEAD_PROBES`] positions after a first candidate
fn lookahead(data: &[u8], from: usize) -> Option<String> {
    (from..from + NAME_LOOKAHEAD_PROBES)
        .take_while(|&probe| probe + 4 < data.len())
        .find_map(|probe| {
            let len = plausible_length(read_i32(data, probe)?)?;
            let start = probe + 4;
            decode(data.get(start..start + len)?)
        })
}

/// Read the name record that follows a bank-name marker at `offset`.
///
/// Returns `None` if the buffer ends before a viable candidate is found.
pub fn read_length_prefixed_name(data: &[u8], offset: usize) -> Option<String> {
    let mut pos = offset;

    while pos < data.len() {
        pos += 1;

        let raw = read_i32(data, pos)?;
        pos += 4;

        let Some(len) = plausible_length(raw) else {
            continue;
        };

        let end = pos + len;
        if end > data.len() {
            return None;
        }

        if let Some(candidate) = decode(&data[pos..end]) {
            return Some(lookahead(data, end).unwrap_or(candidate));
        }

        pos = end;
    }

    None
}
