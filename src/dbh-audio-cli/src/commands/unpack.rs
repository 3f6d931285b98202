//! Unpack command handler

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::cli::UnpackArgs;
use crate::file_utils::bank_output_dir;

/// Where the WEMs of `bank` go: `<output>/<bank stem>` or next to the bank
fn output_dir(bank: &Path, output: Option<&Path>) -> PathBuf {
    match output {
        Some(root) => {
            let stem = bank.file_stem().unwrap_or(bank.as_os_str());
            root.join(stem)
        }
        None => bank_output_dir(bank),
    }
}

/// Handle the unpack command
pub fn handle(args: UnpackArgs) -> Result<()> {
    for bank in &args.banks {
        let out_dir = output_dir(bank, args.output.as_deref());

        let unpacked = dbh_audio::unpack_bank(bank, &out_dir, args.swap, args.dump_objects)
            .with_context(|| format!("Failed to unpack {}", bank.display()))?;

        for id in &unpacked.out_of_range {
            warn!(bank = %bank.display(), id, "Index entry points outside the DATA section");
        }
        if let Some(error) = &unpacked.hirc_error {
            warn!(bank = %bank.display(), %error, "HIRC objects incomplete");
        }
        if let Some(objects) = &unpacked.objects_file {
            info!(path = %objects.display(), "Objects file written");
        }
        if unpacked.wems.is_empty() {
            warn!(bank = %bank.display(), "No WEM files found in bank");
        }

        info!(
            bank = %bank.display(),
            wems = unpacked.wems.len(),
            output = %out_dir.display(),
            "Unpacked"
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_output_dir() {
        let bank = Path::new("/data/banks/Music.bnk");
        assert_eq!(output_dir(bank, None), PathBuf::from("/data/banks/Music"));
        assert_eq!(
            output_dir(bank, Some(Path::new("/out"))),
            PathBuf::from("/out/Music")
        );
    }

    #[test]
    fn test_handle_unpacks_each_bank() {
        let dir = tempfile::tempdir().unwrap();
        let bank = dir.path().join("Music.bnk");

        let mut data = b"DIDX".to_vec();
        data.extend_from_slice(&12u32.to_le_bytes());
        for v in [7u32, 0, 2] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        data.extend_from_slice(b"DATA");
        data.extend_from_slice(&2u32.to_le_bytes());
        data.extend_from_slice(b"ok");
        fs::write(&bank, data).unwrap();

        handle(UnpackArgs {
            banks: vec![bank],
            output: Some(dir.path().join("out")),
            swap: false,
            dump_objects: false,
        })
        .unwrap();

        assert_eq!(fs::read(dir.path().join("out/Music/7.wem")).unwrap(), b"ok");
    }

    #[test]
    fn test_handle_missing_bank() {
        let dir = tempfile::tempdir().unwrap();
        let result = handle(UnpackArgs {
            banks: vec![dir.path().join("missing.bnk")],
            output: None,
            swap: false,
            dump_objects: false,
        });
        assert!(result.is_err());
    }
}
