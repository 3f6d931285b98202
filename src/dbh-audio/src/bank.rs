//! Sound bank extraction
//!
//! Bank blocks (`CSNDBKDT`) and bank name records (`CSNDBNK_`) are scanned
//! independently. Nothing links a name record to its block, so they are
//! correlated by position: resolved name N names bank block N. Whenever the
//! two counts disagree the pairing has drifted and
//! [`BankExtraction::pairing_drift`] reports it.

use crate::boundary::slice_to_terminator;
use crate::name::read_length_prefixed_name;
use crate::output::sanitize_file_name;
use crate::report::{Attempt, PairingDrift, Skip, SkipReason};
use crate::scan::{find_from, scan};
use crate::session::CancelToken;
use crate::signature::{BANK_DATA, BANK_HEADER, BANK_NAME};
use crate::Result;

/// A bank carved out of a volume, starting at its `BKHD` section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankAsset<'a> {
    pub name: String,
    /// Name is `UNK_BANK_<index>` because no resolved name was available
    pub fallback_name: bool,
    /// Position among the bank blocks of this volume
    pub index: usize,
    /// Offset of the bank marker in the volume
    pub offset: usize,
    pub bytes: &'a [u8],
}

/// Banks found in one volume
#[derive(Debug, Default)]
pub struct BankExtraction<'a> {
    /// One attempt per bank block, in offset order
    pub banks: Vec<Attempt<BankAsset<'a>>>,
    /// Resolved names, in name-record order
    pub names: Vec<String>,
    pub cancelled: bool,
}

impl BankExtraction<'_> {
    /// Name/block count mismatch, if any
    pub fn pairing_drift(&self) -> Option<PairingDrift> {
        if self.cancelled || self.names.len() == self.banks.len() {
            return None;
        }
        Some(PairingDrift {
            names: self.names.len(),
            banks: self.banks.len(),
        })
    }

    pub fn assets(&self) -> impl Iterator<Item = &BankAsset<'_>> {
        self.banks.iter().filter_map(|b| b.as_ref().ok())
    }
}

/// Synthetic name for bank block `index`
pub fn fallback_name(index: usize) -> String {
    format!("UNK_BANK_{index}")
}

/// Drop everything before the first `BKHD` section
pub fn fix_header(block: &[u8]) -> Option<&[u8]> {
    find_from(block, BANK_HEADER.bytes, 0).map(|start| &block[start..])
}

/// Resolve every bank name record, discarding unresolved ones
pub fn resolve_names(data: &[u8], cancel: &CancelToken) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for offset in scan(data, BANK_NAME.bytes)? {
        if cancel.is_cancelled() {
            break;
        }
        if let Some(name) = read_length_prefixed_name(data, offset) {
            names.push(name);
        }
    }
    Ok(names)
}

fn extract_one<'a>(
    data: &'a [u8],
    offset: usize,
    index: usize,
    names: &[String],
) -> Attempt<BankAsset<'a>> {
    let block =
        slice_to_terminator(data, offset).ok_or(Skip::new(offset, SkipReason::EmptyRange))?;
    let bytes = fix_header(block).ok_or(Skip::new(offset, SkipReason::MissingBankHeader))?;

    let resolved = names
        .get(index)
        .map(|name| sanitize_file_name(name))
        .filter(|name| !name.is_empty());

    let (name, fallback) = match resolved {
        Some(name) => (name, false),
        None => (fallback_name(index), true),
    };

    Ok(BankAsset {
        name,
        fallback_name: fallback,
        index,
        offset,
        bytes,
    })
}

/// Carve every sound bank out of `data`
pub fn extract_banks<'a>(data: &'a [u8], cancel: &CancelToken) -> Result<BankExtraction<'a>> {
    let names = resolve_names(data, cancel)?;
    let offsets = scan(data, BANK_DATA.bytes)?;

    let mut extraction = BankExtraction {
        banks: Vec::with_capacity(offsets.len()),
        names,
        cancelled: false,
    };

    for (index, offset) in offsets.into_iter().enumerate() {
        if cancel.is_cancelled() {
            extraction.cancelled = true;
            break;
        }
        let attempt = extract_one(data, offset, index, &extraction.names);
        extraction.banks.push(attempt);
    }

    if cancel.is_cancelled() {
        extraction.cancelled = true;
    }

    Ok(extraction)
}
