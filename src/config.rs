use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Knobs of one analysis run. Every field may be omitted from a config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Class names whose assignments are never recorded, such as library
    /// namespaces that only look like classes.
    pub reserved_class_names: Vec<String>,
    /// Record edits made by the engine's own core files. When off, core
    /// files only feed the inheritance map.
    pub include_core_edits: bool,
    /// Read and parse files on the rayon thread pool.
    pub parallel_parse: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            reserved_class_names: vec!["$".to_string(), "_".to_string()],
            include_core_edits: true,
            parallel_parse: true,
        }
    }
}

impl AnalysisConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn is_reserved(&self, class_name: &str) -> bool {
        self.reserved_class_names.iter().any(|r| r == class_name)
    }
}
