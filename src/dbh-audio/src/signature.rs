//! Signature bytes and heuristic constants shared by every extractor

/// A named, immutable byte pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub name: &'static str,
    pub bytes: &'static [u8],
}

impl Signature {
    pub const fn new(name: &'static str, bytes: &'static [u8]) -> Self {
        Self { name, bytes }
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Check whether `data` holds this signature at `offset` (bounds-checked)
    #[inline]
    pub fn matches_at(&self, data: &[u8], offset: usize) -> bool {
        offset
            .checked_add(self.len())
            .and_then(|end| data.get(offset..end))
            .is_some_and(|window| window == self.bytes)
    }
}

/// Sound bank data block: "CSNDBKDT"
pub const BANK_DATA: Signature = Signature::new(
    "bank-data",
    &[0x43, 0x53, 0x4E, 0x44, 0x42, 0x4B, 0x44, 0x54],
);

/// Sound bank name record: "CSNDBNK_"
pub const BANK_NAME: Signature = Signature::new(
    "bank-name",
    &[0x43, 0x53, 0x4E, 0x44, 0x42, 0x4E, 0x4B, 0x5F],
);

/// Dialogue container: "CSNDDATA"
pub const DIALOGUE: Signature = Signature::new("dialogue", b"CSNDDATA");

/// WEM payload start
pub const RIFF: Signature = Signature::new("riff", b"RIFF");

/// Raw MIDI file record: "QZIP\0RAW_FILE"
pub const MIDI_RAW_FILE: Signature = Signature::new(
    "midi-raw-file",
    &[0x51, 0x5A, 0x49, 0x50, 0x00, 0x52, 0x41, 0x57, 0x5F, 0x46, 0x49, 0x4C, 0x45],
);

pub const MIDI: Signature = Signature::new("midi", b"MIDI");

pub const MTHD: Signature = Signature::new("mthd", b"MThd");

pub const MTRK: Signature = Signature::new("mtrk", b"MTrk");

/// First section of a valid Wwise bank: "BKHD"
pub const BANK_HEADER: Signature = Signature::new("bank-header", &[0x42, 0x4B, 0x48, 0x44]);

/// End-of-block sentinel used throughout the archive
pub const TERMINATOR: Signature = Signature::new("terminator", &[0x2D; 6]);

/// Every signature the engine scans for
pub const ALL: &[Signature] = &[
    BANK_DATA,
    BANK_NAME,
    DIALOGUE,
    RIFF,
    MIDI_RAW_FILE,
    MIDI,
    MTHD,
    MTRK,
    BANK_HEADER,
    TERMINATOR,
];

/// Upper bound for a plausible length-prefixed name
pub const MAX_NAME_LENGTH: i32 = 1000;

/// Probe positions tried after a first name candidate
pub const NAME_LOOKAHEAD_PROBES: usize = 0x20;

/// All-digit dialogue segments longer than this are hashes, not path parts
pub const NOISE_DIGITS_MAX: usize = 10;

/// Bytes scanned after `MTrk` for a track name meta event
pub const MIDI_NAME_WINDOW: usize = 200;
