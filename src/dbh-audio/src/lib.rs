//! Audio extractor for BigFile containers
//!
//! BigFile volumes are monolithic, undocumented archives. Nothing in them
//! records where an embedded asset starts or ends, so extraction works by
//! signature scanning plus a few boundary heuristics:
//!
//! - Sound banks: `CSNDBKDT` marker, trimmed to the first `BKHD` section,
//!   named positionally from `CSNDBNK_` name records
//! - Dialogue: `CSNDDATA` marker, an underscore-separated path/language token
//!   string, then a `RIFF` (WEM) payload
//! - MIDI: `QZIP\0RAW_FILE` marker, `MIDI` + `MThd` at fixed offsets, name
//!   taken from the first track's meta events
//!
//! Every payload runs until the next run of six `0x2D` bytes, or the end of
//! the volume.
//!
//! The extractors are pure: they return borrowed assets and skip records.
//! [`ExtractionSession`] writes them to the output tree and aggregates a
//! [`Report`].

pub mod bank;
pub mod bnk;
pub mod boundary;
mod container;
pub mod dialogue;
pub mod language;
pub mod midi;
pub mod name;
pub mod output;
mod report;
pub mod scan;
mod session;
pub mod signature;

pub use bank::{extract_banks, BankAsset, BankExtraction};
pub use bnk::{
    unpack_bank, unpack_bytes, Bank, BankHeader, HircObject, IndexEntry, Unpacked, UnpackedWem,
};
pub use boundary::{find_terminator, slice_to_terminator};
pub use container::Container;
pub use dialogue::{extract_dialogue, DialogueAsset};
pub use language::{folder_for, Language, LanguageSelection, LANGUAGES};
pub use midi::{extract_midi, MidiAsset};
pub use name::read_length_prefixed_name;
pub use output::OutputLayout;
pub use report::{
    AssetKind, Attempt, KindSummary, Outcome, PairingDrift, Report, Skip, SkipReason, Status,
    Summary,
};
pub use scan::{find_from, scan};
pub use session::{CancelToken, ExtractOptions, ExtractionSession};
pub use signature::Signature;

use std::path::PathBuf;

/// Errors from container scanning and extraction
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Invalid pattern: search patterns must not be empty")]
    InvalidPattern,

    #[error("Container unavailable: {path:?}: {source}")]
    InputUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed data at offset {offset:#x}: {reason}")]
    Malformed { offset: usize, reason: String },

    #[error("Data too short: need {needed} bytes, got {actual}")]
    DataTooShort { needed: usize, actual: usize },

    #[error("Invalid bank section at offset {offset:#x}: {reason}")]
    InvalidBankSection { offset: usize, reason: String },
}

impl Error {
    pub fn malformed<S: Into<String>>(offset: usize, reason: S) -> Self {
        Self::Malformed {
            offset,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidPattern;
        assert!(err.to_string().contains("must not be empty"));

        let err = Error::InputUnavailable {
            path: PathBuf::from("BigFile_PC.dat"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(err.to_string().contains("BigFile_PC.dat"));

        let err = Error::malformed(0x40, "length out of range");
        assert_eq!(
            err.to_string(),
            "Malformed data at offset 0x40: length out of range"
        );

        let err = Error::DataTooShort {
            needed: 8,
            actual: 4,
        };
        assert!(err.to_string().contains("need 8 bytes"));
    }
}
