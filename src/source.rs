use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::parser::ast::{Node, NodeId};
use crate::parser::JsParser;

/// Where a file comes from. Core files always load before any plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Core,
    Plugin,
}

/// A location in a source file: byte offset, 1-based line, 0-based column
/// counted in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Location {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: Location,
    pub end: Location,
}

#[derive(Debug, Clone, Copy)]
struct NodeEntry {
    parent: Option<NodeId>,
    start: usize,
    end: usize,
}

/// Read-only companion table of a tree, indexed by node id.
#[derive(Debug, Default)]
pub struct NodeIndex {
    entries: Vec<Option<NodeEntry>>,
}

impl NodeIndex {
    pub fn build(root: &Node) -> Self {
        let mut entries: Vec<Option<NodeEntry>> = vec![];
        let mut stack = vec![(root, None)];
        while let Some((node, parent)) = stack.pop() {
            let index = node.id().index();
            if entries.len() <= index {
                entries.resize(index + 1, None);
            }
            entries[index] = Some(NodeEntry {
                parent,
                start: node.meta.start_index,
                end: node.meta.end_index,
            });
            for child in node.children() {
                stack.push((child, Some(node.id())));
            }
        }
        NodeIndex { entries }
    }

    fn entry(&self, id: NodeId) -> Option<&NodeEntry> {
        self.entries.get(id.index()).and_then(|e| e.as_ref())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.entry(id).and_then(|e| e.parent)
    }

    /// Byte range of the node in its source text.
    pub fn range(&self, id: NodeId) -> Option<(usize, usize)> {
        self.entry(id).map(|e| (e.start, e.end))
    }

    /// Parent chain of `id`, nearest first, excluding `id` itself.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            index: self,
            next: self.parent(id),
        }
    }

    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        self.ancestors(id).any(|a| a == ancestor)
    }
}

pub struct Ancestors<'a> {
    index: &'a NodeIndex,
    next: Option<NodeId>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.index.parent(current);
        Some(current)
    }
}

/// Maps byte offsets to lines and columns.
#[derive(Debug)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        let mut chars = text.char_indices().peekable();
        while let Some((offset, c)) = chars.next() {
            match c {
                '\r' => {
                    if let Some((_, '\n')) = chars.peek() {
                        chars.next();
                        line_starts.push(offset + 2);
                    } else {
                        line_starts.push(offset + 1);
                    }
                }
                '\n' => line_starts.push(offset + 1),
                '\u{2028}' | '\u{2029}' => line_starts.push(offset + c.len_utf8()),
                _ => {}
            }
        }
        LineIndex { line_starts }
    }

    pub fn locate(&self, text: &str, offset: usize) -> Location {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let line_start = self.line_starts[line];
        let column = text
            .get(line_start..offset)
            .map_or(offset - line_start, |s| s.chars().count());
        Location {
            offset,
            line: line + 1,
            column,
        }
    }
}

/// One parsed script with its lookup tables. Immutable once built.
#[derive(Debug)]
pub struct SourceFile {
    name: String,
    origin: Origin,
    text: String,
    program: Node,
    nodes: NodeIndex,
    lines: LineIndex,
}

impl SourceFile {
    pub fn parse(name: &str, text: String, origin: Origin) -> Result<Self> {
        let program = JsParser::parse_to_ast_from_str(&text).map_err(|e| Error::Parse {
            file: name.to_string(),
            source: Box::new(e.with_path(name)),
        })?;
        let nodes = NodeIndex::build(&program);
        let lines = LineIndex::new(&text);
        debug!(file = name, bytes = text.len(), "parsed source file");
        Ok(SourceFile {
            name: name.to_string(),
            origin,
            text,
            program,
            nodes,
            lines,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn program(&self) -> &Node {
        &self.program
    }

    pub fn nodes(&self) -> &NodeIndex {
        &self.nodes
    }

    /// Raw source text of a node.
    pub fn text_of(&self, node: &Node) -> &str {
        self.text
            .get(node.meta.start_index..node.meta.end_index)
            .unwrap_or_default()
    }

    pub fn span_of(&self, node: &Node) -> Span {
        Span {
            start: self.lines.locate(&self.text, node.meta.start_index),
            end: self.lines.locate(&self.text, node.meta.end_index),
        }
    }
}
