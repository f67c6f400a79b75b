//! Declarative reader for `js/plugins.js`.
//!
//! The file is a generated script assigning one array literal to `$plugins`.
//! It is parsed, never run: the initializer is turned into JSON values and
//! anything that is not a plain literal is rejected.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::{Error, Result};
use crate::parser::ast::{LiteralValue, Node, NodeKind};
use crate::parser::JsParser;

const PLUGIN_LIST_VARIABLE: &str = "$plugins";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginEntry {
    pub name: String,
    #[serde(default)]
    pub status: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

impl PluginEntry {
    pub fn file_name(&self) -> String {
        format!("{}.js", self.name)
    }
}

/// Decodes every entry, enabled or not, in list order.
pub fn decode_plugin_list(path: &Path, script: &str) -> Result<Vec<PluginEntry>> {
    let invalid = |message: String| Error::PluginList {
        path: path.to_path_buf(),
        message,
    };
    let program = JsParser::parse_to_ast_from_str(script).map_err(|e| Error::Parse {
        file: path.display().to_string(),
        source: Box::new(e),
    })?;
    let init = find_initializer(&program)
        .ok_or_else(|| invalid(format!("no `{}` declaration", PLUGIN_LIST_VARIABLE)))?;
    let value = to_json(init, script).map_err(invalid)?;
    if !value.is_array() {
        return Err(invalid(format!("`{}` is not an array", PLUGIN_LIST_VARIABLE)));
    }
    serde_json::from_value(value).map_err(|e| invalid(e.to_string()))
}

fn find_initializer(program: &Node) -> Option<&Node> {
    let mut found = None;
    program.walk(&mut |node| {
        if found.is_some() {
            return;
        }
        if let NodeKind::VariableDeclarator { id, init: Some(init) } = &node.kind {
            if id.identifier_name() == Some(PLUGIN_LIST_VARIABLE) {
                found = Some(init.as_ref());
            }
        }
    });
    found
}

fn to_json(node: &Node, script: &str) -> std::result::Result<Value, String> {
    match &node.kind {
        NodeKind::Literal { value, .. } => match value {
            LiteralValue::String(s) => Ok(Value::String(s.clone())),
            LiteralValue::Boolean(b) => Ok(Value::Bool(*b)),
            LiteralValue::Null => Ok(Value::Null),
            LiteralValue::Number(n) => number(*n),
            _ => Err(unsupported(node, script)),
        },
        NodeKind::UnaryExpression {
            operator, argument, ..
        } if operator == "-" => match &argument.kind {
            NodeKind::Literal {
                value: LiteralValue::Number(n),
                ..
            } => number(-n),
            _ => Err(unsupported(node, script)),
        },
        NodeKind::ArrayExpression { elements } => elements
            .iter()
            .map(|element| match element {
                Some(element) => to_json(element, script),
                None => Err("array holes are not allowed".to_string()),
            })
            .collect::<std::result::Result<Vec<_>, _>>()
            .map(Value::Array),
        NodeKind::ObjectExpression { properties } => {
            let mut object = Map::new();
            for property in properties {
                let (key, value) = match &property.kind {
                    NodeKind::Property {
                        key,
                        value,
                        method: false,
                        shorthand: false,
                        computed: false,
                        ..
                    } => (key, value),
                    _ => return Err(unsupported(property, script)),
                };
                let key = match &key.kind {
                    NodeKind::Identifier { name } => name.clone(),
                    NodeKind::Literal {
                        value: LiteralValue::String(s),
                        ..
                    } => s.clone(),
                    NodeKind::Literal {
                        value: LiteralValue::Number(n),
                        ..
                    } => n.to_string(),
                    _ => return Err(unsupported(key, script)),
                };
                object.insert(key, to_json(value, script)?);
            }
            Ok(Value::Object(object))
        }
        _ => Err(unsupported(node, script)),
    }
}

fn number(n: f64) -> std::result::Result<Value, String> {
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        return Ok(Value::Number(Number::from(n as i64)));
    }
    Number::from_f64(n)
        .map(Value::Number)
        .ok_or_else(|| format!("{} has no JSON form", n))
}

fn unsupported(node: &Node, script: &str) -> String {
    let text = script
        .get(node.meta.start_index..node.meta.end_index)
        .unwrap_or_default();
    format!("unsupported {} `{}`", node.type_name(), text)
}
