//! RPG Maker project layout: engine detection, core libraries and the
//! enabled plugins, loaded in the order the engine loads them.

pub mod plugins;
mod reader;

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::analysis::Analysis;
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::project::plugins::{decode_plugin_list, PluginEntry};
use crate::source::{Origin, SourceFile};

pub use reader::{DiskReader, FileReader, MemoryReader};

const MV_CORE: [&str; 6] = [
    "rpg_core.js",
    "rpg_managers.js",
    "rpg_objects.js",
    "rpg_scenes.js",
    "rpg_sprites.js",
    "rpg_windows.js",
];

const MZ_CORE: [&str; 6] = [
    "rmmz_core.js",
    "rmmz_managers.js",
    "rmmz_objects.js",
    "rmmz_scenes.js",
    "rmmz_sprites.js",
    "rmmz_windows.js",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EngineVersion {
    MV,
    MZ,
}

impl EngineVersion {
    pub fn core_libraries(&self) -> &'static [&'static str] {
        match self {
            EngineVersion::MV => &MV_CORE,
            EngineVersion::MZ => &MZ_CORE,
        }
    }
}

/// One file to load, with its place in the project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectFile {
    pub name: String,
    pub path: PathBuf,
    pub origin: Origin,
}

#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
    version: EngineVersion,
    plugins: Vec<PluginEntry>,
}

impl Project {
    /// Detects the engine and decodes `js/plugins.js`. No script other than
    /// the plugin list is read here.
    pub fn open<R: FileReader>(root: &Path, reader: &R) -> Result<Self> {
        let js = root.join("js");
        let version = if reader.exists(&js.join("rmmz_core.js")) {
            EngineVersion::MZ
        } else {
            EngineVersion::MV
        };
        let list_path = js.join("plugins.js");
        let plugins = decode_plugin_list(&list_path, &reader.read_to_string(&list_path)?)?;
        info!(
            root = %root.display(),
            version = ?version,
            plugins = plugins.len(),
            "opened project"
        );
        Ok(Project {
            root: root.to_path_buf(),
            version,
            plugins,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn version(&self) -> EngineVersion {
        self.version
    }

    /// Every entry of the plugin list, enabled or not.
    pub fn plugins(&self) -> &[PluginEntry] {
        &self.plugins
    }

    pub fn enabled_plugins(&self) -> impl Iterator<Item = &PluginEntry> {
        self.plugins.iter().filter(|p| p.status)
    }

    /// Core libraries, then enabled plugins in list order.
    pub fn files(&self) -> Vec<ProjectFile> {
        let js = self.root.join("js");
        let core = self.version.core_libraries().iter().map(|name| ProjectFile {
            name: name.to_string(),
            path: js.join(name),
            origin: Origin::Core,
        });
        let plugins = self.enabled_plugins().map(|plugin| {
            let name = plugin.file_name();
            ProjectFile {
                path: js.join("plugins").join(&name),
                name,
                origin: Origin::Plugin,
            }
        });
        core.chain(plugins).collect()
    }

    /// Reads and parses every file. The first failure ends the load.
    pub fn load<R: FileReader>(&self, reader: &R, config: &AnalysisConfig) -> Result<Vec<SourceFile>> {
        let files = self.files();
        let load_one = |file: &ProjectFile| -> Result<SourceFile> {
            let text = reader.read_to_string(&file.path)?;
            SourceFile::parse(&file.name, text, file.origin)
        };
        debug!(files = files.len(), parallel = config.parallel_parse, "loading project files");
        if config.parallel_parse {
            files.par_iter().map(load_one).collect()
        } else {
            files.iter().map(load_one).collect()
        }
    }

    pub fn analyze<R: FileReader>(&self, reader: &R, config: &AnalysisConfig) -> Result<Analysis> {
        let files = self.load(reader, config)?;
        Ok(Analysis::run(&files, config))
    }
}

/// Opens, loads and analyzes the project at `root` in one go.
pub fn analyze_project<R: FileReader>(root: &Path, reader: &R, config: &AnalysisConfig) -> Result<Analysis> {
    Project::open(root, reader)?.analyze(reader, config)
}
