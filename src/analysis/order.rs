//! Load order suggestion from active conflicts.
//!
//! Every active conflict between two plugin files is resolved by moving the
//! file of the later edit ahead of the file of the earlier one. Files are
//! sorted by how many files transitively have to come ahead of them and then
//! packed, back to front, into groups that carry no ordering requirement among
//! their members.

use std::collections::VecDeque;

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use tracing::debug;

use crate::analysis::conflict::Conflict;

/// Precedence facts for one file.
#[derive(Debug, Default, Clone)]
pub struct OrderNode {
    /// Files that should load before this one.
    pub ahead: IndexSet<String>,
    /// Files that should load after this one.
    pub behind: IndexSet<String>,
    /// Everything reachable through `ahead`, in discovery order.
    pub transitive_ahead: Vec<String>,
}

impl OrderNode {
    pub fn transitive_ahead_count(&self) -> usize {
        self.transitive_ahead.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrderSuggestion {
    /// Groups to load front to back. Members of a group may load in any order.
    pub groups: Vec<Vec<String>>,
    /// Files that end up ahead of themselves; their constraints cannot all be met.
    pub cycles: Vec<String>,
}

/// Builds the precedence graph over `files`. Conflicts naming a file outside
/// `files`, and conflicts inside a single file, place no constraint.
pub fn build_graph<'c, I>(files: &[String], conflicts: I) -> IndexMap<String, OrderNode>
where
    I: IntoIterator<Item = &'c Conflict>,
{
    let mut graph: IndexMap<String, OrderNode> = files
        .iter()
        .map(|file| (file.clone(), OrderNode::default()))
        .collect();
    for conflict in conflicts {
        let (earlier, later) = (&conflict.earlier.file, &conflict.later.file);
        if earlier == later || !graph.contains_key(earlier) || !graph.contains_key(later) {
            continue;
        }
        if let Some(node) = graph.get_mut(earlier) {
            node.ahead.insert(later.clone());
        }
        if let Some(node) = graph.get_mut(later) {
            node.behind.insert(earlier.clone());
        }
    }
    let closures: Vec<Vec<String>> = graph.keys().map(|file| reachable(&graph, file)).collect();
    for (node, closure) in graph.values_mut().zip(closures) {
        node.transitive_ahead = closure;
    }
    graph
}

/// Files reachable from `start` through `ahead` edges, `start` itself only
/// when it lies on a cycle.
pub fn reachable(graph: &IndexMap<String, OrderNode>, start: &str) -> Vec<String> {
    let mut visited: IndexSet<&str> = IndexSet::new();
    let mut stack: Vec<&str> = match graph.get(start) {
        Some(node) => node.ahead.iter().rev().map(String::as_str).collect(),
        None => return vec![],
    };
    while let Some(file) = stack.pop() {
        if !visited.insert(file) {
            continue;
        }
        if let Some(node) = graph.get(file) {
            stack.extend(
                node.ahead
                    .iter()
                    .rev()
                    .map(String::as_str)
                    .filter(|next| !visited.contains(next)),
            );
        }
    }
    visited.into_iter().map(str::to_string).collect()
}

pub fn suggest_order<'c, I>(files: &[String], conflicts: I) -> OrderSuggestion
where
    I: IntoIterator<Item = &'c Conflict>,
{
    let graph = build_graph(files, conflicts);
    let cycles: Vec<String> = graph
        .iter()
        .filter(|(file, node)| node.transitive_ahead.contains(*file))
        .map(|(file, _)| file.clone())
        .collect();

    let mut sorted: Vec<(&String, &OrderNode)> = graph.iter().collect();
    sorted.sort_by_key(|(_, node)| node.transitive_ahead_count());

    let mut groups: VecDeque<Vec<&String>> = VecDeque::new();
    for (file, node) in sorted.into_iter().rev() {
        let fits_front = groups.front().map_or(false, |group| {
            !group.iter().any(|member| node.behind.contains(*member))
        });
        if !fits_front {
            groups.push_front(vec![file]);
        } else if let Some(group) = groups.front_mut() {
            group.push(file);
        }
    }
    let groups: Vec<Vec<String>> = groups
        .into_iter()
        .map(|mut group| {
            group.sort_by_key(|file| graph.get_index_of(*file));
            group.into_iter().cloned().collect()
        })
        .collect();
    debug!(groups = groups.len(), cycles = cycles.len(), "suggested load order");
    OrderSuggestion { groups, cycles }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::conflict::ConflictKind;
    use crate::analysis::history::{Edit, PatchStyle};
    use crate::source::{Location, Origin, Span};

    fn edit(file: &str) -> Edit {
        let location = Location {
            offset: 0,
            line: 1,
            column: 0,
        };
        let span = Span {
            start: location,
            end: location,
        };
        Edit {
            file: file.to_string(),
            origin: Origin::Plugin,
            span,
            style: PatchStyle::Overwrite,
            class_name: "A".to_string(),
            method_name: "f".to_string(),
            is_static: false,
            display_name: "A.prototype.f".to_string(),
            target_span: span,
            alias_count: 0,
            changed: true,
            owner: None,
        }
    }

    fn conflict(earlier: &str, later: &str) -> Conflict {
        Conflict {
            kind: ConflictKind::Outdated,
            earlier: edit(earlier),
            later: edit(later),
        }
    }

    fn files(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn no_conflicts_means_one_group() {
        let suggestion = suggest_order(&files(&["a.js", "b.js", "c.js"]), &Vec::<Conflict>::new());
        assert_eq!(suggestion.groups, vec![files(&["a.js", "b.js", "c.js"])]);
        assert!(suggestion.cycles.is_empty());
        assert_eq!(
            suggest_order(&[], &Vec::<Conflict>::new()),
            OrderSuggestion::default()
        );
    }

    #[test]
    fn one_conflict_splits_two_files() {
        let suggestion = suggest_order(&files(&["A.js", "B.js"]), &[conflict("A.js", "B.js")]);
        assert_eq!(suggestion.groups, vec![files(&["B.js"]), files(&["A.js"])]);
    }

    #[test]
    fn chain_is_linearized() {
        let conflicts = [conflict("a.js", "b.js"), conflict("b.js", "c.js")];
        let suggestion = suggest_order(&files(&["a.js", "b.js", "c.js", "d.js"]), &conflicts);
        assert_eq!(
            suggestion.groups,
            vec![
                files(&["c.js"]),
                files(&["b.js", "d.js"]),
                files(&["a.js"])
            ]
        );
    }

    #[test]
    fn transitive_counts_follow_ahead_edges() {
        let conflicts = [conflict("a.js", "b.js"), conflict("b.js", "c.js")];
        let graph = build_graph(&files(&["a.js", "b.js", "c.js"]), &conflicts);
        assert_eq!(graph["a.js"].transitive_ahead, files(&["b.js", "c.js"]));
        assert_eq!(graph["b.js"].transitive_ahead_count(), 1);
        assert_eq!(graph["c.js"].transitive_ahead_count(), 0);
        assert!(graph["c.js"].behind.contains("b.js"));
    }

    #[test]
    fn cycles_are_reported_and_grouping_still_completes() {
        let conflicts = [conflict("a.js", "b.js"), conflict("b.js", "a.js")];
        let suggestion = suggest_order(&files(&["a.js", "b.js"]), &conflicts);
        assert_eq!(suggestion.cycles, files(&["a.js", "b.js"]));
        let placed: usize = suggestion.groups.iter().map(Vec::len).sum();
        assert_eq!(placed, 2);
    }

    #[test]
    fn unknown_and_same_file_conflicts_are_skipped() {
        let conflicts = [conflict("rpg_objects.js", "a.js"), conflict("a.js", "a.js")];
        let suggestion = suggest_order(&files(&["a.js"]), &conflicts);
        assert_eq!(suggestion.groups, vec![files(&["a.js"])]);
        assert!(suggestion.cycles.is_empty());
    }
}
