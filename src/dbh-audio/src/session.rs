//! Extraction session: runs the extractors over one volume and writes assets

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::bank::extract_banks;
use crate::bnk::unpack_bytes;
use crate::container::Container;
use crate::dialogue::{extract_dialogue, UNKNOWN_DIALOGUE};
use crate::language::LanguageSelection;
use crate::midi::extract_midi;
use crate::output::{write_file, OutputLayout};
use crate::report::{AssetKind, Outcome, Report, SkipReason, Status};
use crate::Result;

/// Shared cancellation flag, checked between occurrences
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// What to extract and where
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub output: PathBuf,
    pub languages: LanguageSelection,
    /// Flatten dialogue paths into file names
    pub flatten: bool,
    pub banks: bool,
    pub dialogue: bool,
    pub midi: bool,
    /// Unpack every written bank into `wem/banks/<bank>/`
    pub unpack_banks: bool,
    /// Prefix for synthetic names, set when several volumes share an output
    pub namespace: Option<String>,
    pub cancel: CancelToken,
}

impl ExtractOptions {
    /// Every category and language, written under `output`
    pub fn new<P: Into<PathBuf>>(output: P) -> Self {
        Self {
            output: output.into(),
            languages: LanguageSelection::all(),
            flatten: false,
            banks: true,
            dialogue: true,
            midi: true,
            unpack_banks: false,
            namespace: None,
            cancel: CancelToken::new(),
        }
    }
}

/// Runs extraction for one volume at a time
#[derive(Debug, Clone)]
pub struct ExtractionSession {
    options: ExtractOptions,
    layout: OutputLayout,
}

impl ExtractionSession {
    pub fn new(options: ExtractOptions) -> Self {
        let layout = OutputLayout::new(&options.output, options.flatten);
        Self { options, layout }
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    /// Map the volume at `path` and extract from it
    pub fn parse<P: AsRef<Path>>(&self, path: P) -> Result<Report> {
        let container = Container::open(path)?;
        self.parse_bytes(&container.name(), &container)
    }

    /// Extract every selected category from `data`
    pub fn parse_bytes(&self, volume: &str, data: &[u8]) -> Result<Report> {
        let mut report = Report::new(volume);
        let cancel = &self.options.cancel;

        if self.options.banks {
            self.banks(data, &mut report)?;
        }
        if self.options.dialogue && !cancel.is_cancelled() {
            self.dialogue(data, &mut report)?;
        }
        if self.options.midi && !cancel.is_cancelled() {
            self.midi(data, &mut report)?;
        }

        report.cancelled = cancel.is_cancelled();
        Ok(report)
    }

    /// Prefix a synthetic name with the volume namespace
    fn synthetic(&self, name: String) -> String {
        match &self.options.namespace {
            Some(namespace) => format!("{namespace}_{name}"),
            None => name,
        }
    }

    fn banks(&self, data: &[u8], report: &mut Report) -> Result<()> {
        let extraction = extract_banks(data, &self.options.cancel)?;
        report.pairing_drift = extraction.pairing_drift();

        for attempt in extraction.banks {
            let bank = match attempt {
                Ok(bank) => bank,
                Err(skip) => {
                    report.skip(AssetKind::Bank, skip);
                    continue;
                }
            };

            let name = if bank.fallback_name {
                self.synthetic(bank.name)
            } else {
                bank.name
            };

            let path = self.layout.bank_path(&name);
            let written = write(
                report,
                AssetKind::Bank,
                bank.offset,
                &name,
                bank.fallback_name,
                path,
                bank.bytes,
            );

            if written && self.options.unpack_banks {
                self.unpack(report, bank.offset, &name, bank.bytes);
            }
        }

        Ok(())
    }

    fn unpack(&self, report: &mut Report, offset: usize, bank: &str, bytes: &[u8]) {
        let out_dir = self.layout.unpacked_wem_dir(bank);
        let volume = report.volume.clone();
        let outcome = |name: String, status: Status| Outcome {
            kind: AssetKind::Wem,
            volume: volume.clone(),
            offset,
            name: Some(name),
            fallback_name: false,
            status,
        };

        let outcomes: Vec<Outcome> = match unpack_bytes(bytes, &out_dir, false, false) {
            Ok(unpacked) => {
                let written = unpacked.wems.into_iter().map(|wem| {
                    outcome(
                        format!("{bank}/{}", wem.id),
                        Status::Extracted {
                            path: wem.path,
                            size: wem.size,
                        },
                    )
                });
                let out_of_range = unpacked.out_of_range.into_iter().map(|id| {
                    outcome(
                        format!("{bank}/{id}"),
                        Status::Skipped {
                            reason: SkipReason::Malformed {
                                detail: "index entry outside DATA section".to_string(),
                            },
                        },
                    )
                });
                written.chain(out_of_range).collect()
            }
            Err(e) => vec![outcome(
                bank.to_string(),
                Status::Failed {
                    error: e.to_string(),
                },
            )],
        };

        for outcome in outcomes {
            report.push(outcome);
        }
    }

    fn dialogue(&self, data: &[u8], report: &mut Report) -> Result<()> {
        let attempts = extract_dialogue(data, &self.options.languages, &self.options.cancel)?;

        for attempt in attempts {
            let clip = match attempt {
                Ok(clip) => clip,
                Err(skip) => {
                    report.skip(AssetKind::Dialogue, skip);
                    continue;
                }
            };

            let fallback = clip.leaf == UNKNOWN_DIALOGUE || clip.language_fallback;
            let path = self
                .layout
                .dialogue_path(clip.folder, &clip.directories, &clip.leaf);

            let mut name = clip.directories.join("/");
            if !name.is_empty() {
                name.push('/');
            }
            name.push_str(&clip.leaf);

            write(
                report,
                AssetKind::Dialogue,
                clip.offset,
                &name,
                fallback,
                path,
                clip.bytes,
            );
        }

        Ok(())
    }

    fn midi(&self, data: &[u8], report: &mut Report) -> Result<()> {
        let attempts = extract_midi(data, &self.options.cancel)?;

        for attempt in attempts {
            let track = match attempt {
                Ok(track) => track,
                Err(skip) => {
                    report.skip(AssetKind::Midi, skip);
                    continue;
                }
            };

            let name = if track.fallback_name {
                self.synthetic(track.name)
            } else {
                track.name
            };

            let path = self.layout.midi_path(&name);
            write(
                report,
                AssetKind::Midi,
                track.offset,
                &name,
                track.fallback_name,
                path,
                track.bytes,
            );
        }

        Ok(())
    }
}

/// Write one asset and record the outcome; returns whether it was written
fn write(
    report: &mut Report,
    kind: AssetKind,
    offset: usize,
    name: &str,
    fallback_name: bool,
    path: PathBuf,
    bytes: &[u8],
) -> bool {
    let status = match write_file(&path, bytes) {
        Ok(()) => Status::Extracted {
            path,
            size: bytes.len(),
        },
        Err(e) => Status::Failed {
            error: format!("{}: {e}", path.display()),
        },
    };
    let written = matches!(status, Status::Extracted { .. });

    report.push(Outcome {
        kind,
        volume: report.volume.clone(),
        offset,
        name: Some(name.to_string()),
        fallback_name,
        status,
    });

    written
}
