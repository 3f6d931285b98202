//! Extract command handler
//!
//! Resolves volumes and options from arguments and config, scans the volumes
//! in parallel and renders every outcome through `tracing`.

use anyhow::{bail, Context, Result};
use dbh_audio::language::language_by_code;
use dbh_audio::{
    AssetKind, CancelToken, Container, ExtractOptions, ExtractionSession, LanguageSelection,
    Outcome, Report, SkipReason, Status, Summary,
};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::cli::ExtractArgs;
use crate::config::Config;
use crate::file_utils::discover_volumes;

/// Output directory used when neither flag nor config names one
pub const DEFAULT_OUTPUT: &str = "extracted";

/// A volume that could not be read
#[derive(Debug, Serialize)]
pub struct VolumeFailure {
    pub volume: PathBuf,
    pub error: String,
}

/// JSON report written by `--report`
#[derive(Debug, Default, Serialize)]
pub struct BatchReport {
    pub volumes: Vec<Report>,
    pub failures: Vec<VolumeFailure>,
    pub summary: Summary,
}

/// Resolve the language selection from arguments, then config, then all
fn languages(args: &[String], config: &Config) -> Result<LanguageSelection> {
    let codes = if !args.is_empty() {
        args
    } else if let Some(codes) = &config.languages {
        codes.as_slice()
    } else {
        return Ok(LanguageSelection::all());
    };

    for code in codes {
        if language_by_code(code.trim()).is_none() {
            bail!("Unknown language code '{code}' (see `dbh-audio languages`)");
        }
    }

    Ok(LanguageSelection::new(codes))
}

/// Volumes named on the command line, or discovered in the game directory
fn volumes(args: &ExtractArgs, config: &Config) -> Result<Vec<PathBuf>> {
    if !args.volumes.is_empty() {
        return Ok(args.volumes.clone());
    }

    let game_dir = args
        .game_dir
        .clone()
        .or_else(|| config.game_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));

    let volumes = discover_volumes(&game_dir)?;
    if volumes.is_empty() {
        bail!(
            "No BigFile volumes found in {} (pass volumes or --game-dir)",
            game_dir.display()
        );
    }
    Ok(volumes)
}

fn build_options(
    args: &ExtractArgs,
    config: &Config,
    cancel: CancelToken,
) -> Result<ExtractOptions> {
    let output = args
        .output
        .clone()
        .or_else(|| config.output.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

    let mut options = ExtractOptions::new(output);
    options.languages = languages(&args.languages, config)?;
    options.flatten = args.flatten || config.flatten();
    options.unpack_banks = args.unpack_banks || config.unpack_banks();
    options.banks = !args.no_banks;
    options.dialogue = !args.no_dialogue;
    options.midi = !args.no_midi;
    options.cancel = cancel;

    if !(options.banks || options.dialogue || options.midi) {
        bail!("Nothing to extract: every category is disabled");
    }

    Ok(options)
}

/// Emit one event per outcome
fn log_outcome(outcome: &Outcome) {
    let kind = outcome.kind;
    let name = outcome.name.as_deref().unwrap_or("-");
    let offset = format!("{:#x}", outcome.offset);
    let volume = outcome.volume.as_str();

    match &outcome.status {
        Status::Extracted { path, size } if outcome.fallback_name => info!(
            %kind, name, %offset, volume,
            path = %path.display(), size = *size,
            "Extracted with fallback name"
        ),
        Status::Extracted { path, size } => debug!(
            %kind, name, %offset, volume,
            path = %path.display(), size = *size,
            "Extracted"
        ),
        Status::Skipped {
            reason: reason @ SkipReason::LanguageNotSelected { .. },
        } => debug!(%kind, %offset, volume, %reason, "Skipped"),
        Status::Skipped { reason } => info!(%kind, %offset, volume, %reason, "Skipped"),
        Status::Failed { error } => warn!(%kind, name, %offset, volume, %error, "Failed"),
    }
}

fn log_report(report: &Report) {
    for outcome in &report.outcomes {
        log_outcome(outcome);
    }

    if let Some(drift) = report.pairing_drift {
        warn!(
            volume = %report.volume,
            names = drift.names,
            banks = drift.banks,
            "Bank name count does not match bank count; positional names may be shifted"
        );
    }

    let summary = report.summary();
    for (kind, counts) in &summary.kinds {
        info!(
            volume = %report.volume,
            %kind,
            extracted = counts.extracted,
            fallback = counts.fallback,
            skipped = counts.skipped,
            failed = counts.failed,
            "Volume summary"
        );
    }
}

fn scan_volume(
    path: &Path,
    mut options: ExtractOptions,
    namespaced: bool,
) -> dbh_audio::Result<Report> {
    let container = Container::open(path)?;
    if namespaced {
        options.namespace = Some(container.namespace());
    }
    ExtractionSession::new(options).parse_bytes(&container.name(), &container)
}

fn write_report(path: &Path, report: &BatchReport) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create report file {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), report)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;
    Ok(())
}

/// Handle the extract command
pub fn handle(args: ExtractArgs, cancel: CancelToken) -> Result<()> {
    let config = Config::load()?;
    let volumes = volumes(&args, &config)?;
    let options = build_options(&args, &config, cancel.clone())?;

    if let Some(jobs) = args.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    info!(
        volumes = volumes.len(),
        output = %options.output.display(),
        languages = options.languages.len(),
        "Extracting"
    );

    let namespaced = volumes.len() > 1;

    let pb = ProgressBar::new(volumes.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .context("Invalid progress template")?
            .progress_chars("#>-"),
    );

    let results: Vec<(PathBuf, dbh_audio::Result<Report>)> = volumes
        .par_iter()
        .map(|path| {
            let result = scan_volume(path, options.clone(), namespaced);
            pb.inc(1);
            (path.clone(), result)
        })
        .collect();

    pb.finish_and_clear();

    let mut batch = BatchReport::default();
    for (path, result) in results {
        match result {
            Ok(report) => {
                log_report(&report);
                batch.summary += &report.summary();
                batch.volumes.push(report);
            }
            Err(e) => {
                error!(volume = %path.display(), error = %e, "Volume unavailable");
                batch.failures.push(VolumeFailure {
                    volume: path,
                    error: e.to_string(),
                });
            }
        }
    }

    let total = batch.summary.total();
    info!(
        extracted = total.extracted,
        fallback = total.fallback,
        skipped = total.skipped,
        failed = total.failed,
        banks = batch.summary.get(AssetKind::Bank).extracted,
        dialogue = batch.summary.get(AssetKind::Dialogue).extracted,
        midi = batch.summary.get(AssetKind::Midi).extracted,
        "Extraction finished"
    );

    if cancel.is_cancelled() {
        warn!("Extraction cancelled; output is incomplete");
    }

    if let Some(path) = &args.report {
        write_report(path, &batch)?;
        info!(path = %path.display(), "Report written");
    }

    if batch.volumes.is_empty() {
        bail!("No volume could be read");
    }

    Ok(())
}
