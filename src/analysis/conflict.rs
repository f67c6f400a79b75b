use serde::Serialize;

use crate::analysis::history::{Edit, Histories};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictKind {
    /// A later edit throws away a different earlier implementation.
    Replace,
    /// A patch captured an implementation that was later replaced.
    Outdated,
}

impl ConflictKind {
    pub fn letter(&self) -> char {
        match self {
            ConflictKind::Replace => 'W',
            ConflictKind::Outdated => 'D',
        }
    }
}

/// Two edits that cannot both take effect as written.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conflict {
    pub kind: ConflictKind,
    pub earlier: Edit,
    pub later: Edit,
}

impl Conflict {
    /// Full replacements on both sides cannot be fixed by reordering.
    pub fn ignored_by_default(&self) -> bool {
        self.kind == ConflictKind::Replace
            && self.earlier.style.is_replacement()
            && self.later.style.is_replacement()
    }

    pub fn name(&self) -> &str {
        &self.later.display_name
    }
}

pub fn enumerate_conflicts(histories: &Histories) -> Vec<Conflict> {
    let mut conflicts = vec![];
    for (key, history) in &histories.methods {
        let aliases = histories.aliases_of(key);
        for (previous, edit) in history.iter().zip(history.iter().skip(1)) {
            if !edit.style.is_replacement() {
                continue;
            }
            if edit.changed {
                conflicts.push(Conflict {
                    kind: ConflictKind::Replace,
                    earlier: previous.clone(),
                    later: edit.clone(),
                });
            }
            let registered = &aliases[..edit.alias_count.min(aliases.len())];
            for patch in registered.iter().filter_map(|record| histories.resolve(record)) {
                conflicts.push(Conflict {
                    kind: ConflictKind::Outdated,
                    earlier: patch.clone(),
                    later: edit.clone(),
                });
            }
        }
    }
    conflicts
}
