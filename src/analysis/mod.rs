pub mod conflict;
pub mod history;
pub mod inheritance;
pub mod matcher;
pub mod order;

use serde::Serialize;
use tracing::info;

use crate::analysis::conflict::{enumerate_conflicts, Conflict};
use crate::analysis::history::Histories;
use crate::analysis::inheritance::InheritanceMap;
use crate::analysis::order::{suggest_order, OrderSuggestion};
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::source::{Origin, SourceFile};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    pub name: String,
    pub origin: Origin,
}

/// Result of one analysis run. Everything is fixed once built except the
/// ignore flags, which only feed [`Analysis::suggest_order`].
#[derive(Debug)]
pub struct Analysis {
    files: Vec<FileEntry>,
    inheritance: InheritanceMap,
    histories: Histories,
    conflicts: Vec<Conflict>,
    ignored: Vec<bool>,
}

/// A conflict paired with its ignore flag, as written to reports.
#[derive(Debug, Serialize)]
pub struct ConflictReport<'a> {
    #[serde(flatten)]
    pub conflict: &'a Conflict,
    pub ignored: bool,
}

impl Analysis {
    /// `files` must be in load order: core files first, then enabled plugins.
    pub fn run(files: &[SourceFile], config: &AnalysisConfig) -> Self {
        let inheritance = InheritanceMap::build(files);
        let histories = Histories::build(files, &inheritance, config);
        let conflicts = enumerate_conflicts(&histories);
        let ignored: Vec<bool> = conflicts.iter().map(Conflict::ignored_by_default).collect();
        info!(
            files = files.len(),
            methods = histories.methods.len(),
            edits = histories.edit_count(),
            conflicts = conflicts.len(),
            ignored = ignored.iter().filter(|i| **i).count(),
            "analysis finished"
        );
        Analysis {
            files: files
                .iter()
                .map(|file| FileEntry {
                    name: file.name().to_string(),
                    origin: file.origin(),
                })
                .collect(),
            inheritance,
            histories,
            conflicts,
            ignored,
        }
    }

    pub fn files(&self) -> &[FileEntry] {
        &self.files
    }

    /// Plugin file names in load order; the only files an order can move.
    pub fn plugin_files(&self) -> Vec<String> {
        self.files
            .iter()
            .filter(|f| f.origin == Origin::Plugin)
            .map(|f| f.name.clone())
            .collect()
    }

    pub fn inheritance(&self) -> &InheritanceMap {
        &self.inheritance
    }

    pub fn histories(&self) -> &Histories {
        &self.histories
    }

    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    pub fn is_ignored(&self, index: usize) -> bool {
        self.ignored.get(index).copied().unwrap_or(false)
    }

    /// Returns false when `index` names no conflict.
    pub fn set_ignored(&mut self, index: usize, ignored: bool) -> bool {
        match self.ignored.get_mut(index) {
            Some(flag) => {
                *flag = ignored;
                true
            }
            None => false,
        }
    }

    /// Flips one flag and returns its new value.
    pub fn toggle_ignored(&mut self, index: usize) -> Option<bool> {
        let flag = self.ignored.get_mut(index)?;
        *flag = !*flag;
        Some(*flag)
    }

    pub fn active_conflicts(&self) -> impl Iterator<Item = &Conflict> {
        self.conflicts
            .iter()
            .zip(self.ignored.iter())
            .filter(|(_, ignored)| !**ignored)
            .map(|(conflict, _)| conflict)
    }

    pub fn reports(&self) -> Vec<ConflictReport<'_>> {
        self.conflicts
            .iter()
            .zip(self.ignored.iter())
            .map(|(conflict, ignored)| ConflictReport {
                conflict,
                ignored: *ignored,
            })
            .collect()
    }

    /// Cheap to call again after changing ignore flags.
    pub fn suggest_order(&self) -> OrderSuggestion {
        suggest_order(&self.plugin_files(), self.active_conflicts())
    }

    pub fn to_json(&self) -> Result<String> {
        #[derive(Serialize)]
        struct Document<'a> {
            files: &'a [FileEntry],
            conflicts: Vec<ConflictReport<'a>>,
            order: OrderSuggestion,
        }
        let document = Document {
            files: &self.files,
            conflicts: self.reports(),
            order: self.suggest_order(),
        };
        Ok(serde_json::to_string_pretty(&document)?)
    }
}
