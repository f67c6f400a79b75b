//! Structural comparison of syntax trees.
//!
//! A [`Template`] is an expression fragment parsed with a small metavariable
//! vocabulary. Each metavariable matches any node at its position and is
//! captured for the caller; everything else must agree exactly. Node ids and
//! source positions never take part in a comparison.

use std::mem::discriminant;

use crate::error::{Error, Result};
use crate::parser::ast::{Field, Node, NodeKind};
use crate::parser::JsParser;

/// Identifiers that become metavariables when a template is built, compared
/// ASCII case-insensitively.
pub const METAVARIABLES: [&str; 5] = ["foo", "bar", "baz", "qux", "quux"];

/// Metavariable bindings of one successful match, keyed by lowercase name.
#[derive(Debug, Default)]
pub struct Captures<'a> {
    bindings: Vec<(String, &'a Node)>,
}

impl<'a> Captures<'a> {
    /// The node bound to `name`. A metavariable used twice binds its first
    /// occurrence.
    pub fn get(&self, name: &str) -> Option<&'a Node> {
        self.bindings
            .iter()
            .find(|(bound, _)| bound.eq_ignore_ascii_case(name))
            .map(|(_, node)| *node)
    }
}

#[derive(Debug)]
pub struct Template {
    source: String,
    root: Node,
}

impl Template {
    pub fn new(source: &str) -> Result<Self> {
        let root = JsParser::parse_template_from_str(source, &METAVARIABLES).map_err(|e| {
            Error::Template {
                template: source.to_string(),
                source: Box::new(e),
            }
        })?;
        Ok(Template {
            source: source.to_string(),
            root,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, candidate: &Node) -> bool {
        self.captures(candidate).is_some()
    }

    pub fn captures<'a>(&self, candidate: &'a Node) -> Option<Captures<'a>> {
        let mut captures = Captures::default();
        if compare(&self.root, candidate, &mut Some(&mut captures)) {
            Some(captures)
        } else {
            None
        }
    }
}

/// Exact structural equality; no node is a wildcard.
pub fn structurally_equal(a: &Node, b: &Node) -> bool {
    compare(a, b, &mut None)
}

fn compare<'a>(
    pattern: &Node,
    candidate: &'a Node,
    captures: &mut Option<&mut Captures<'a>>,
) -> bool {
    if let Some(bindings) = captures {
        if let NodeKind::Metavariable { name } = &pattern.kind {
            bindings.bindings.push((name.to_ascii_lowercase(), candidate));
            return true;
        }
    }
    if discriminant(&pattern.kind) != discriminant(&candidate.kind) {
        return false;
    }
    let expected = pattern.fields();
    let actual = candidate.fields();
    expected.len() == actual.len()
        && expected
            .iter()
            .zip(actual.iter())
            .all(|((_, e), (_, a))| compare_field(e, a, captures))
}

fn compare_field<'a>(
    expected: &Field<'_>,
    actual: &Field<'a>,
    captures: &mut Option<&mut Captures<'a>>,
) -> bool {
    match (*expected, *actual) {
        (Field::Node(e), Field::Node(a)) => compare(e, a, captures),
        (Field::OptionalNode(e), Field::OptionalNode(a)) => match (e, a) {
            (Some(e), Some(a)) => compare(e, a, captures),
            (None, None) => true,
            _ => false,
        },
        (Field::List(e), Field::List(a)) => {
            e.len() == a.len() && e.iter().zip(a.iter()).all(|(e, a)| compare(e, a, captures))
        }
        (Field::SparseList(e), Field::SparseList(a)) => {
            e.len() == a.len()
                && e.iter().zip(a.iter()).all(|(e, a)| match (e, a) {
                    (Some(e), Some(a)) => compare(e, a, captures),
                    (None, None) => true,
                    _ => false,
                })
        }
        (Field::Str(e), Field::Str(a)) => e == a,
        (Field::Bool(e), Field::Bool(a)) => e == a,
        (Field::Literal(e), Field::Literal(a)) => e == a,
        _ => false,
    }
}
