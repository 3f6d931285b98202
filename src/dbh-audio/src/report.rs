//! Per-occurrence extraction records
//!
//! Extractors never print. Each occurrence they visit becomes either an
//! asset or a [`Skip`]; the session turns both into [`Outcome`]s so callers
//! can count fallbacks and skips without parsing log output.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::AddAssign;
use std::path::PathBuf;

/// Category of an extracted asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Bank,
    Dialogue,
    Midi,
    /// WEM unpacked from an extracted bank
    Wem,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bank => "bank",
            Self::Dialogue => "dialogue",
            Self::Midi => "midi",
            Self::Wem => "wem",
        };
        f.write_str(name)
    }
}

/// Why a candidate occurrence produced no asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Candidate range was empty (terminator directly at the start)
    EmptyRange,
    /// Bank range holds no `BKHD` section
    MissingBankHeader,
    /// No `RIFF` payload after a dialogue marker
    NoRiffMagic,
    /// Dialogue language is not part of the selection
    LanguageNotSelected { code: String },
    /// `MIDI` magic missing at its fixed offset
    MissingMidiMagic,
    /// `MThd` magic missing at its fixed offset
    MissingMidiHeader,
    Malformed { detail: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyRange => f.write_str("empty candidate range"),
            Self::MissingBankHeader => f.write_str("no BKHD section in bank range"),
            Self::NoRiffMagic => f.write_str("no RIFF payload after dialogue marker"),
            Self::LanguageNotSelected { code } => write!(f, "language {code} not selected"),
            Self::MissingMidiMagic => f.write_str("MIDI magic not at expected offset"),
            Self::MissingMidiHeader => f.write_str("MThd magic not at expected offset"),
            Self::Malformed { detail } => write!(f, "malformed: {detail}"),
        }
    }
}

/// A skipped occurrence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skip {
    pub offset: usize,
    pub reason: SkipReason,
}

impl Skip {
    pub fn new(offset: usize, reason: SkipReason) -> Self {
        Self { offset, reason }
    }
}

/// Result of visiting one occurrence
pub type Attempt<T> = std::result::Result<T, Skip>;

/// Final state of one occurrence
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Status {
    Extracted { path: PathBuf, size: usize },
    Skipped { reason: SkipReason },
    /// The asset was found but could not be written
    Failed { error: String },
}

/// Structured record for one extraction attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub kind: AssetKind,
    pub volume: String,
    pub offset: usize,
    pub name: Option<String>,
    /// Name was synthesised (`UNK_BANK_<n>`, `UnknownMidi_<n>`, ...) or the
    /// dialogue language defaulted to `UNK`
    pub fallback_name: bool,
    #[serde(flatten)]
    pub status: Status,
}

impl Outcome {
    pub fn is_extracted(&self) -> bool {
        matches!(self.status, Status::Extracted { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.status, Status::Skipped { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, Status::Failed { .. })
    }
}

/// Resolved bank names and bank blocks disagree in count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PairingDrift {
    pub names: usize,
    pub banks: usize,
}

/// Counters for one asset kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KindSummary {
    pub extracted: usize,
    pub fallback: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl KindSummary {
    pub fn total(&self) -> usize {
        self.extracted + self.skipped + self.failed
    }
}

impl AddAssign for KindSummary {
    fn add_assign(&mut self, other: Self) {
        self.extracted += other.extracted;
        self.fallback += other.fallback;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

/// Counters per asset kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub kinds: BTreeMap<AssetKind, KindSummary>,
}

impl Summary {
    pub fn get(&self, kind: AssetKind) -> KindSummary {
        self.kinds.get(&kind).copied().unwrap_or_default()
    }

    pub fn total(&self) -> KindSummary {
        let mut total = KindSummary::default();
        for summary in self.kinds.values() {
            total += *summary;
        }
        total
    }
}

impl AddAssign<&Summary> for Summary {
    fn add_assign(&mut self, other: &Summary) {
        for (kind, summary) in &other.kinds {
            *self.kinds.entry(*kind).or_default() += *summary;
        }
    }
}

/// Everything that happened while scanning one volume
#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    pub volume: String,
    pub outcomes: Vec<Outcome>,
    pub pairing_drift: Option<PairingDrift>,
    pub cancelled: bool,
}

impl Report {
    pub fn new<S: Into<String>>(volume: S) -> Self {
        Self {
            volume: volume.into(),
            ..Self::default()
        }
    }

    pub fn push(&mut self, outcome: Outcome) {
        self.outcomes.push(outcome);
    }

    pub fn skip(&mut self, kind: AssetKind, skip: Skip) {
        self.push(Outcome {
            kind,
            volume: self.volume.clone(),
            offset: skip.offset,
            name: None,
            fallback_name: false,
            status: Status::Skipped {
                reason: skip.reason,
            },
        });
    }

    pub fn of_kind(&self, kind: AssetKind) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter().filter(move |o| o.kind == kind)
    }

    pub fn extracted(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter().filter(|o| o.is_extracted())
    }

    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default();

        for outcome in &self.outcomes {
            let counters = summary.kinds.entry(outcome.kind).or_default();
            match outcome.status {
                Status::Extracted { .. } => {
                    counters.extracted += 1;
                    if outcome.fallback_name {
                        counters.fallback += 1;
                    }
                }
                Status::Skipped { .. } => counters.skipped += 1,
                Status::Failed { .. } => counters.failed += 1,
            }
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extracted(kind: AssetKind, name: &str, fallback: bool) -> Outcome {
        Outcome {
            kind,
            volume: "BigFile_PC.dat".to_string(),
            offset: 0,
            name: Some(name.to_string()),
            fallback_name: fallback,
            status: Status::Extracted {
                path: PathBuf::from(name),
                size: 4,
            },
        }
    }

    #[test]
    fn test_summary_counts() {
        let mut report = Report::new("BigFile_PC.dat");
        report.push(extracted(AssetKind::Bank, "Music", false));
        report.push(extracted(AssetKind::Bank, "UNK_BANK_1", true));
        report.skip(
            AssetKind::Bank,
            Skip::new(0x100, SkipReason::MissingBankHeader),
        );
        report.skip(
            AssetKind::Dialogue,
            Skip::new(
                0x200,
                SkipReason::LanguageNotSelected {
                    code: "GER".to_string(),
                },
            ),
        );

        let summary = report.summary();
        let banks = summary.get(AssetKind::Bank);
        assert_eq!(banks.extracted, 2);
        assert_eq!(banks.fallback, 1);
        assert_eq!(banks.skipped, 1);
        assert_eq!(summary.get(AssetKind::Dialogue).skipped, 1);
        assert_eq!(summary.get(AssetKind::Midi), KindSummary::default());
        assert_eq!(summary.total().total(), 4);
    }

    #[test]
    fn test_summary_merge() {
        let mut report = Report::new("a");
        report.push(extracted(AssetKind::Midi, "Theme", false));

        let mut total = Summary::default();
        total += &report.summary();
        total += &report.summary();
        assert_eq!(total.get(AssetKind::Midi).extracted, 2);
    }

    #[test]
    fn test_skip_reason_display() {
        let reason = SkipReason::LanguageNotSelected {
            code: "FRE".to_string(),
        };
        assert_eq!(reason.to_string(), "language FRE not selected");
        assert_eq!(
            SkipReason::MissingBankHeader.to_string(),
            "no BKHD section in bank range"
        );
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome = extracted(AssetKind::Dialogue, "FILE", false);
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["kind"], "dialogue");
        assert_eq!(json["status"], "extracted");
        assert_eq!(json["size"], 4);
    }
}
