use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::error::{Error, Result};

/// Source of project files. Implementations must be shareable across the
/// rayon pool.
pub trait FileReader: Sync {
    fn exists(&self, path: &Path) -> bool;

    fn read_to_string(&self, path: &Path) -> Result<String>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DiskReader;

impl FileReader for DiskReader {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Files held in memory, keyed by full path.
#[derive(Debug, Default, Clone)]
pub struct MemoryReader {
    files: IndexMap<PathBuf, String>,
}

impl MemoryReader {
    pub fn new() -> Self {
        MemoryReader::default()
    }

    pub fn insert<P: Into<PathBuf>, S: Into<String>>(&mut self, path: P, text: S) {
        self.files.insert(path.into(), text.into());
    }

    pub fn with_file<P: Into<PathBuf>, S: Into<String>>(mut self, path: P, text: S) -> Self {
        self.insert(path, text);
        self
    }
}

impl FileReader for MemoryReader {
    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.files.get(path).cloned().ok_or_else(|| Error::Read {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        })
    }
}
