//! File system utilities for locating container volumes

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// First volume of a BigFile set
pub const PRIMARY_VOLUME: &str = "BigFile_PC.dat";

/// Prefix shared by the numbered sibling volumes (`BigFile_PC.d01`, ...)
const SIBLING_PREFIX: &str = "BigFile_PC.d";

/// Whether `name` is the primary volume or a numbered sibling
pub fn is_volume_name(name: &str) -> bool {
    if name.eq_ignore_ascii_case(PRIMARY_VOLUME) {
        return true;
    }
    name.get(..SIBLING_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(SIBLING_PREFIX))
        && name[SIBLING_PREFIX.len()..].len() >= 2
        && name[SIBLING_PREFIX.len()..].bytes().all(|b| b.is_ascii_digit())
}

/// Primary volume first, then siblings in numeric order
fn volume_order(path: &Path) -> (bool, String) {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    (!name.eq_ignore_ascii_case(PRIMARY_VOLUME), name)
}

/// Find the BigFile volumes directly inside `game_dir`
pub fn discover_volumes(game_dir: &Path) -> Result<Vec<PathBuf>> {
    if !game_dir.is_dir() {
        anyhow::bail!("Game directory not found: {}", game_dir.display());
    }

    let mut volumes = Vec::new();
    for entry in walkdir::WalkDir::new(game_dir).min_depth(1).max_depth(1) {
        let entry = entry
            .with_context(|| format!("Failed to list game directory {}", game_dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.file_name().to_str().is_some_and(is_volume_name) {
            volumes.push(entry.into_path());
        }
    }

    volumes.sort_by_key(|p| volume_order(p));
    Ok(volumes)
}

/// Default output directory for an unpacked bank: next to it, named after it
pub fn bank_output_dir(bank: &Path) -> PathBuf {
    let stem = bank.file_stem().unwrap_or(bank.as_os_str());
    bank.with_file_name(stem)
}
