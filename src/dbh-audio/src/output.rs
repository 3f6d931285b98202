//! Output tree layout
//!
//! ```text
//! <root>/banks/<name>.bnk
//! <root>/wem/dialogue/<LANGUAGE>/<segment>/.../<leaf>.wem
//! <root>/wem/banks/<bank>/<id>.wem
//! <root>/midi/<name>.mid
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const BANKS_DIR: &str = "banks";
pub const WEM_DIR: &str = "wem";
pub const DIALOGUE_DIR: &str = "dialogue";
pub const MIDI_DIR: &str = "midi";

/// Characters that are not allowed in a file name on any supported platform
const INVALID_FILE_NAME_CHARS: &[char] = &['"', '<', '>', '|', ':', '*', '?', '\\', '/'];

/// Remove characters that cannot appear in a file name
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_control() && !INVALID_FILE_NAME_CHARS.contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Where each asset kind is written
#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
    /// Join dialogue path segments into the file name instead of nesting
    flatten: bool,
}

impl OutputLayout {
    pub fn new<P: Into<PathBuf>>(root: P, flatten: bool) -> Self {
        Self {
            root: root.into(),
            flatten,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn flatten(&self) -> bool {
        self.flatten
    }

    pub fn bank_path(&self, name: &str) -> PathBuf {
        self.root.join(BANKS_DIR).join(format!("{name}.bnk"))
    }

    pub fn midi_path(&self, name: &str) -> PathBuf {
        self.root.join(MIDI_DIR).join(format!("{name}.mid"))
    }

    /// Directory receiving the WEMs unpacked from bank `name`.
    ///
    /// Kept under `wem/banks/` so no bank name can land in the dialogue tree.
    pub fn unpacked_wem_dir(&self, name: &str) -> PathBuf {
        self.root.join(WEM_DIR).join(BANKS_DIR).join(name)
    }

    /// Path for a dialogue clip in language folder `folder`
    pub fn dialogue_path(&self, folder: &str, directories: &[String], leaf: &str) -> PathBuf {
        let mut path = self.root.join(WEM_DIR).join(DIALOGUE_DIR).join(folder);

        let directories = directories
            .iter()
            .map(|d| sanitize_file_name(d))
            .filter(|d| !d.is_empty());
        let leaf = sanitize_file_name(leaf);

        if self.flatten {
            let mut parts: Vec<String> = directories.collect();
            parts.push(leaf);
            path.push(format!("{}.wem", parts.join("_")));
        } else {
            path.extend(directories);
            path.push(format!("{leaf}.wem"));
        }

        path
    }
}

/// Write `bytes` to `path`, creating parent directories as needed
pub fn write_file(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        // create_dir_all tolerates concurrent creators
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bytes)
}
