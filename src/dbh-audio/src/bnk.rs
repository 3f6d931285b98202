//! Sound bank (`.bnk`) parsing and WEM unpacking
//!
//! A bank is a flat list of `[tag: 4][size: u32][payload: size]` sections.
//! Only the sections needed to locate embedded WEMs and list HIRC objects
//! are interpreted:
//!
//! - `BKHD`: bank version and id
//! - `DIDX`: `(id, offset, size)` entries, offsets relative to `DATA`
//! - `DATA`: concatenated WEM payloads
//! - `HIRC`: hierarchy objects (events and event actions are decoded)

use byteorder::{ByteOrder, BE, LE};
use std::fmt::Write as _;
use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::output::write_file;
use crate::{Error, Result};

/// Section header size (tag + size)
pub const SECTION_HEADER_SIZE: usize = 8;

/// DIDX entry size
pub const INDEX_ENTRY_SIZE: usize = 12;

/// First bank version that stores event action counts as a single byte
pub const SHORT_ACTION_COUNT_VERSION: u32 = 134;

/// Name of the HIRC listing written next to unpacked WEMs
pub const OBJECTS_FILE: &str = "objects.txt";

const HIRC_EVENT_ACTION: u8 = 3;
const HIRC_EVENT: u8 = 4;

/// Bounds-checked reader over one section or object body
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
    swap: bool,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8], swap: bool) -> Self {
        Self { data, pos: 0, swap }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self.pos + len;
        let bytes = self.data.get(self.pos..end).ok_or(Error::DataTooShort {
            needed: end,
            actual: self.data.len(),
        })?;
        self.pos = end;
        Ok(bytes)
    }

    fn skip(&mut self, len: usize) -> Result<()> {
        self.take(len).map(|_| ())
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn i8(&mut self) -> Result<i8> {
        Ok(self.u8()? as i8)
    }

    fn u32(&mut self) -> Result<u32> {
        let bytes = self.take(4)?;
        Ok(if self.swap {
            BE::read_u32(bytes)
        } else {
            LE::read_u32(bytes)
        })
    }
}

/// `BKHD` contents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BankHeader {
    pub version: u32,
    pub id: u32,
}

/// One `DIDX` entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    pub id: u32,
    /// Offset relative to the start of the `DATA` payload
    pub offset: u32,
    pub size: u32,
}

impl IndexEntry {
    fn range(&self) -> Range<usize> {
        let start = self.offset as usize;
        start..start + self.size as usize
    }
}

/// Decoded `HIRC` object
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HircObject {
    Event {
        id: u32,
        action_ids: Vec<u32>,
    },
    EventAction {
        id: u32,
        scope: u8,
        action_type: u8,
        game_object_id: u32,
        /// `(parameter type, value)` pairs
        parameters: Vec<(u8, i8)>,
    },
    Other {
        kind: u8,
        id: u32,
    },
}

impl HircObject {
    pub fn id(&self) -> u32 {
        match self {
            Self::Event { id, .. } | Self::EventAction { id, .. } | Self::Other { id, .. } => *id,
        }
    }

    fn parse(kind: u8, id: u32, body: &mut Reader<'_>, version: u32) -> Result<Self> {
        match kind {
            HIRC_EVENT => {
                let count = if version >= SHORT_ACTION_COUNT_VERSION {
                    u32::from(body.u8()?)
                } else {
                    body.u32()?
                };
                let action_ids = (0..count).map(|_| body.u32()).collect::<Result<_>>()?;
                Ok(Self::Event { id, action_ids })
            }
            HIRC_EVENT_ACTION => {
                let scope = body.u8()?;
                let action_type = body.u8()?;
                let game_object_id = body.u32()?;
                body.skip(1)?;
                let count = usize::from(body.u8()?);
                let types = body.take(count)?.to_vec();
                let values = (0..count).map(|_| body.i8()).collect::<Result<Vec<_>>>()?;
                Ok(Self::EventAction {
                    id,
                    scope,
                    action_type,
                    game_object_id,
                    parameters: types.into_iter().zip(values).collect(),
                })
            }
            _ => Ok(Self::Other { kind, id }),
        }
    }
}

/// A parsed bank borrowing its payload
#[derive(Debug, Clone)]
pub struct Bank<'a> {
    bytes: &'a [u8],
    pub header: Option<BankHeader>,
    pub index: Vec<IndexEntry>,
    /// `DATA` payload range within `bytes`
    data: Option<Range<usize>>,
    /// HIRC objects decoded before `hirc_error`, if any
    pub objects: Vec<HircObject>,
    /// Why HIRC decoding stopped early; the other sections are unaffected
    pub hirc_error: Option<String>,
}

impl<'a> Bank<'a> {
    /// Parse all sections of `bytes`.
    ///
    /// `swap` reads every integer field big-endian. Trailing bytes too short
    /// for a section header are ignored.
    pub fn parse(bytes: &'a [u8], swap: bool) -> Result<Self> {
        let mut bank = Self {
            bytes,
            header: None,
            index: Vec::new(),
            data: None,
            objects: Vec::new(),
            hirc_error: None,
        };

        let mut reader = Reader::new(bytes, swap);
        while reader.pos + SECTION_HEADER_SIZE <= bytes.len() {
            let section_start = reader.pos;
            let tag: [u8; 4] = reader.take(4)?.try_into().map_err(|_| {
                Error::InvalidBankSection {
                    offset: section_start,
                    reason: "truncated tag".to_string(),
                }
            })?;
            let size = reader.u32()? as usize;
            let payload_start = reader.pos;
            let payload = reader.take(size).map_err(|_| Error::InvalidBankSection {
                offset: section_start,
                reason: format!(
                    "{} section of {size} bytes overruns the bank ({} bytes)",
                    String::from_utf8_lossy(&tag),
                    bytes.len()
                ),
            })?;

            match &tag {
                b"BKHD" => bank.header = Some(parse_header(payload, swap)?),
                b"DIDX" => bank.index = parse_index(payload, swap)?,
                b"DATA" => bank.data = Some(payload_start..payload_start + size),
                b"HIRC" => {
                    let version = bank.header.map_or(0, |h| h.version);
                    if let Err(e) = parse_hirc(payload, swap, version, &mut bank.objects) {
                        bank.hirc_error = Some(format!("HIRC at {section_start:#x}: {e}"));
                    }
                }
                _ => {}
            }
        }

        Ok(bank)
    }

    /// `DATA` payload, if the bank has one
    pub fn data(&self) -> Option<&'a [u8]> {
        let bytes = self.bytes;
        self.data.clone().map(|range| &bytes[range])
    }

    /// Every index entry with its payload, or `None` when the entry points
    /// outside `DATA`
    pub fn wems(&self) -> impl Iterator<Item = (&IndexEntry, Option<&'a [u8]>)> + '_ {
        let data = self.data();
        self.index
            .iter()
            .map(move |entry| (entry, data.and_then(|d| d.get(entry.range()))))
    }

    /// Human-readable listing of the HIRC objects
    pub fn describe_objects(&self) -> String {
        let mut out = String::new();
        for object in &self.objects {
            let _ = writeln!(out, "Object ID: {}", object.id());
            match object {
                HircObject::Event { action_ids, .. } => {
                    let _ = writeln!(out, "\tType: Event");
                    let _ = writeln!(out, "\tNumber of Actions: {}", action_ids.len());
                    for action in action_ids {
                        let _ = writeln!(out, "\tAction ID: {action}");
                    }
                }
                HircObject::EventAction {
                    scope,
                    action_type,
                    game_object_id,
                    parameters,
                    ..
                } => {
                    let _ = writeln!(out, "\tType: EventAction");
                    let _ = writeln!(out, "\tAction Scope: {scope}");
                    let _ = writeln!(out, "\tAction Type: {action_type}");
                    let _ = writeln!(out, "\tGame Object ID: {game_object_id}");
                    let _ = writeln!(out, "\tNumber of Parameters: {}", parameters.len());
                    for (kind, value) in parameters {
                        let _ = writeln!(out, "\t\tParameter Type: {kind}");
                        let _ = writeln!(out, "\t\tParameter: {value}");
                    }
                }
                HircObject::Other { kind, .. } => {
                    let _ = writeln!(out, "\tType: {kind}");
                }
            }
        }
        out
    }
}

fn parse_header(payload: &[u8], swap: bool) -> Result<BankHeader> {
    let mut reader = Reader::new(payload, swap);
    Ok(BankHeader {
        version: reader.u32()?,
        id: reader.u32()?,
    })
}

fn parse_index(payload: &[u8], swap: bool) -> Result<Vec<IndexEntry>> {
    if payload.len() % INDEX_ENTRY_SIZE != 0 {
        return Err(Error::InvalidBankSection {
            offset: 0,
            reason: format!("DIDX size {} is not a multiple of 12", payload.len()),
        });
    }

    let mut reader = Reader::new(payload, swap);
    (0..payload.len() / INDEX_ENTRY_SIZE)
        .map(|_| {
            Ok(IndexEntry {
                id: reader.u32()?,
                offset: reader.u32()?,
                size: reader.u32()?,
            })
        })
        .collect()
}

/// Decode HIRC objects into `objects`, keeping those read before an error
fn parse_hirc(
    payload: &[u8],
    swap: bool,
    version: u32,
    objects: &mut Vec<HircObject>,
) -> Result<()> {
    let mut reader = Reader::new(payload, swap);
    let count = reader.u32()?;

    for _ in 0..count {
        let kind = reader.u8()?;
        let size = reader.u32()? as usize;
        // Object size covers the id and the body
        let mut body = Reader::new(reader.take(size)?, swap);
        let id = body.u32()?;
        objects.push(HircObject::parse(kind, id, &mut body, version)?);
    }

    Ok(())
}

/// One WEM written by [`unpack_bytes`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnpackedWem {
    pub id: u32,
    pub path: PathBuf,
    pub size: usize,
}

/// Files produced by unpacking one bank
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Unpacked {
    pub wems: Vec<UnpackedWem>,
    /// Ids of index entries pointing outside `DATA`
    pub out_of_range: Vec<u32>,
    pub objects_file: Option<PathBuf>,
    /// HIRC decode failure; WEMs are still unpacked
    pub hirc_error: Option<String>,
}

/// Write every WEM of `bytes` to `<out_dir>/<id>.wem`
pub fn unpack_bytes(
    bytes: &[u8],
    out_dir: &Path,
    swap: bool,
    dump_objects: bool,
) -> Result<Unpacked> {
    let bank = Bank::parse(bytes, swap)?;
    let mut unpacked = Unpacked {
        hirc_error: bank.hirc_error.clone(),
        ..Unpacked::default()
    };

    if dump_objects {
        let path = out_dir.join(OBJECTS_FILE);
        write_file(&path, bank.describe_objects().as_bytes())?;
        unpacked.objects_file = Some(path);
    }

    for (entry, payload) in bank.wems() {
        match payload {
            Some(payload) => {
                let path = out_dir.join(format!("{}.wem", entry.id));
                write_file(&path, payload)?;
                unpacked.wems.push(UnpackedWem {
                    id: entry.id,
                    path,
                    size: payload.len(),
                });
            }
            None => unpacked.out_of_range.push(entry.id),
        }
    }

    Ok(unpacked)
}

/// Unpack the bank file at `path` into `out_dir`
pub fn unpack_bank(
    path: &Path,
    out_dir: &Path,
    swap: bool,
    dump_objects: bool,
) -> Result<Unpacked> {
    let bytes = fs::read(path).map_err(|source| Error::InputUnavailable {
        path: path.to_path_buf(),
        source,
    })?;
    unpack_bytes(&bytes, out_dir, swap, dump_objects)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(tag: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut data = tag.to_vec();
        data.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        data.extend_from_slice(payload);
        data
    }

    fn u32s(values: &[u32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    fn hirc_object(kind: u8, id: u32, body: &[u8]) -> Vec<u8> {
        let mut data = vec![kind];
        data.extend_from_slice(&(body.len() as u32 + 4).to_le_bytes());
        data.extend_from_slice(&id.to_le_bytes());
        data.extend_from_slice(body);
        data
    }

    fn make_bank(version: u32) -> Vec<u8> {
        let mut data = section(b"BKHD", &u32s(&[version, 0xCAFE, 0, 0]));
        data.extend_from_slice(&section(b"DIDX", &u32s(&[100, 0, 4, 200, 4, 3])));
        data.extend_from_slice(&section(b"DATA", b"AAAABBB"));
        data
    }

    #[test]
    fn test_parse_sections() {
        let data = make_bank(120);
        let bank = Bank::parse(&data, false).unwrap();

        assert_eq!(
            bank.header,
            Some(BankHeader {
                version: 120,
                id: 0xCAFE
            })
        );
        assert_eq!(bank.index.len(), 2);
        assert_eq!(bank.data(), Some(&b"AAAABBB"[..]));

        let wems: Vec<_> = bank.wems().map(|(e, p)| (e.id, p)).collect();
        assert_eq!(wems, vec![(100, Some(&b"AAAA"[..])), (200, Some(&b"BBB"[..]))]);
    }

    #[test]
    fn test_swapped_byte_order() {
        let mut data = b"BKHD".to_vec();
        data.extend_from_slice(&8u32.to_be_bytes());
        data.extend_from_slice(&140u32.to_be_bytes());
        data.extend_from_slice(&7u32.to_be_bytes());

        let bank = Bank::parse(&data, true).unwrap();
        assert_eq!(bank.header, Some(BankHeader { version: 140, id: 7 }));
    }

    #[test]
    fn test_out_of_range_entry() {
        let mut data = section(b"DIDX", &u32s(&[1, 0, 2, 2, 5, 10]));
        data.extend_from_slice(&section(b"DATA", b"xyz"));

        let bank = Bank::parse(&data, false).unwrap();
        let wems: Vec<_> = bank.wems().map(|(e, p)| (e.id, p.is_some())).collect();
        assert_eq!(wems, vec![(1, true), (2, false)]);
    }

    #[test]
    fn test_section_overrun() {
        let mut data = b"DATA".to_vec();
        data.extend_from_slice(&100u32.to_le_bytes());
        data.extend_from_slice(b"short");

        assert!(matches!(
            Bank::parse(&data, false),
            Err(Error::InvalidBankSection { offset: 0, .. })
        ));
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        let mut data = make_bank(120);
        data.extend_from_slice(b"---");
        assert!(Bank::parse(&data, false).is_ok());
    }

    #[test]
    fn test_hirc_objects() {
        // Event with u8 action count (version >= 134)
        let mut event_body = vec![2u8];
        event_body.extend_from_slice(&u32s(&[11, 12]));

        let mut action_body = vec![3u8, 4];
        action_body.extend_from_slice(&99u32.to_le_bytes());
        action_body.extend_from_slice(&[0, 1, 0x0E, 0xFB, 0]);

        let mut hirc = 3u32.to_le_bytes().to_vec();
        hirc.extend_from_slice(&hirc_object(HIRC_EVENT, 1, &event_body));
        hirc.extend_from_slice(&hirc_object(HIRC_EVENT_ACTION, 11, &action_body));
        hirc.extend_from_slice(&hirc_object(2, 50, &[0u8; 6]));

        let mut data = section(b"BKHD", &u32s(&[134, 1]));
        data.extend_from_slice(&section(b"HIRC", &hirc));

        let bank = Bank::parse(&data, false).unwrap();
        assert_eq!(
            bank.objects,
            vec![
                HircObject::Event {
                    id: 1,
                    action_ids: vec![11, 12]
                },
                HircObject::EventAction {
                    id: 11,
                    scope: 3,
                    action_type: 4,
                    game_object_id: 99,
                    parameters: vec![(0x0E, -5)],
                },
                HircObject::Other { kind: 2, id: 50 },
            ]
        );

        let listing = bank.describe_objects();
        assert!(listing.contains("Object ID: 1\n\tType: Event\n\tNumber of Actions: 2\n"));
        assert!(listing.contains("\t\tParameter: -5\n"));
        assert!(listing.contains("Object ID: 50\n\tType: 2\n"));
    }

    #[test]
    fn test_event_long_action_count() {
        let body = u32s(&[1, 77]);
        let mut hirc = 1u32.to_le_bytes().to_vec();
        hirc.extend_from_slice(&hirc_object(HIRC_EVENT, 5, &body));

        let mut data = section(b"BKHD", &u32s(&[88, 1]));
        data.extend_from_slice(&section(b"HIRC", &hirc));

        let bank = Bank::parse(&data, false).unwrap();
        assert_eq!(
            bank.objects,
            vec![HircObject::Event {
                id: 5,
                action_ids: vec![77]
            }]
        );
    }

    #[test]
    fn test_broken_hirc_keeps_wems() {
        // Claims two objects but holds one
        let mut hirc = 2u32.to_le_bytes().to_vec();
        hirc.extend_from_slice(&hirc_object(2, 50, &[0u8; 2]));

        let mut data = make_bank(120);
        data.extend_from_slice(&section(b"HIRC", &hirc));

        let bank = Bank::parse(&data, false).unwrap();
        assert_eq!(bank.objects, vec![HircObject::Other { kind: 2, id: 50 }]);
        assert!(bank.hirc_error.is_some());
        assert_eq!(bank.wems().count(), 2);

        let dir = tempfile::tempdir().unwrap();
        let unpacked = unpack_bytes(&data, dir.path(), false, false).unwrap();
        assert_eq!(unpacked.wems.len(), 2);
        assert!(unpacked.hirc_error.is_some());
        assert_eq!(fs::read(dir.path().join("100.wem")).unwrap(), b"AAAA");
    }

    #[test]
    fn test_unpack_bank() {
        let dir = tempfile::tempdir().unwrap();
        let bnk = dir.path().join("Music.bnk");
        fs::write(&bnk, make_bank(120)).unwrap();
        let out = dir.path().join("Music");

        let unpacked = unpack_bank(&bnk, &out, false, true).unwrap();
        assert_eq!(unpacked.wems.len(), 2);
        assert_eq!(unpacked.wems[1].id, 200);
        assert_eq!(unpacked.wems[1].size, 3);
        assert!(unpacked.out_of_range.is_empty());
        assert!(unpacked.hirc_error.is_none());
        assert_eq!(fs::read(out.join("100.wem")).unwrap(), b"AAAA");
        assert_eq!(fs::read(out.join("200.wem")).unwrap(), b"BBB");
        assert_eq!(unpacked.objects_file, Some(out.join(OBJECTS_FILE)));
    }

    #[test]
    fn test_unpack_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = unpack_bank(&dir.path().join("none.bnk"), dir.path(), false, false);
        assert!(matches!(result, Err(Error::InputUnavailable { .. })));
    }
}
