//! Read-only view of one container volume

use memmap2::Mmap;
use std::fs::File;
use std::ops::Deref;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

enum Backing {
    Mapped(Mmap),
    /// Empty files cannot be mapped
    Empty,
    Owned(Vec<u8>),
}

/// A container volume, memory-mapped and never modified
pub struct Container {
    path: PathBuf,
    backing: Backing,
}

impl Container {
    /// Memory-map the volume at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let unavailable = |source: std::io::Error| Error::InputUnavailable {
            path: path.clone(),
            source,
        };

        let file = File::open(&path).map_err(unavailable)?;
        let len = file.metadata().map_err(unavailable)?.len();

        let backing = if len == 0 {
            Backing::Empty
        } else {
            // The mapping is only ever read; concurrent truncation by another
            // process is outside what a scan can guard against.
            Backing::Mapped(unsafe { Mmap::map(&file) }.map_err(unavailable)?)
        };

        Ok(Self { path, backing })
    }

    /// Wrap an in-memory buffer
    pub fn from_bytes<P: Into<PathBuf>>(path: P, bytes: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            backing: Backing::Owned(bytes),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name used to label outcomes
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Prefix for synthetic names. Sibling volumes share a stem, so the
    /// extension is kept: `BigFile_PC.d01` becomes `BigFile_PC_d01`.
    pub fn namespace(&self) -> String {
        self.name().replace('.', "_")
    }
}

impl Deref for Container {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match &self.backing {
            Backing::Mapped(mmap) => mmap,
            Backing::Empty => &[],
            Backing::Owned(bytes) => bytes,
        }
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("path", &self.path)
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_open_maps_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("BigFile_PC.d01");
        fs::write(&path, b"CSNDBKDT").unwrap();

        let container = Container::open(&path).unwrap();
        assert_eq!(&container[..], b"CSNDBKDT");
        assert_eq!(container.name(), "BigFile_PC.d01");
        assert_eq!(container.namespace(), "BigFile_PC_d01");
    }

    #[test]
    fn test_open_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.dat");
        fs::write(&path, b"").unwrap();

        let container = Container::open(&path).unwrap();
        assert!(container.is_empty());
    }

    #[test]
    fn test_open_missing_file() {
        let err = Container::open("/nonexistent/BigFile_PC.dat").unwrap_err();
        assert!(matches!(err, Error::InputUnavailable { .. }));
    }
}
