//! Total, recursive repair of untrusted JSON into [`LogicNode`] trees.
//!
//! Nothing here returns an error: any JSON value maps to a well-formed node.

use serde_json::{Map, Value};
use uuid::Uuid;

use super::{LogicNode, NodeType};

/// Statement used when a node carries no usable claim.
pub const PLACEHOLDER_STATEMENT: &str = "…";

/// Statement of the synthetic node standing in for a non-object value.
pub const INVALID_NODE_STATEMENT: &str = "(invalid node)";

/// Object fields consulted, in order, when an object is coerced to text.
const DISPLAY_FIELDS: &[&str] = &["text", "content", "statement", "value", "name"];

/// Accepted names for the child list.
const CHILDREN_FIELDS: &[&str] = &["children", "nodes"];

/// Accepted names for the proven flag.
const PROVEN_FIELDS: &[&str] = &["isProven", "is_proven"];

/// Generate a fresh node identifier.
pub fn generate_node_id() -> String {
    format!("node-{}", &Uuid::new_v4().simple().to_string()[..8])
}

/// Sanitize an arbitrary JSON value into a logic node.
pub fn sanitize(raw: &Value) -> LogicNode {
    let Some(obj) = raw.as_object() else {
        return invalid_node();
    };

    let id = non_blank(coerce_text(field(obj, &["id"]))).unwrap_or_else(generate_node_id);
    let statement = non_blank(coerce_text(field(obj, &["statement"])))
        .unwrap_or_else(|| PLACEHOLDER_STATEMENT.to_string());
    let method = non_blank(coerce_text(field(obj, &["method"])));
    let reason = non_blank(coerce_text(field(obj, &["reason"])));

    let node_type = match field(obj, &["type"]).as_str().map(str::to_uppercase) {
        Some(t) if t.trim() == "ROOT" => NodeType::Root,
        Some(t) if t.trim() == "LEAF" => NodeType::Leaf,
        _ => NodeType::Node,
    };

    let children = match field(obj, CHILDREN_FIELDS) {
        Value::Array(items) => items.iter().map(sanitize).collect(),
        _ => Vec::new(),
    };

    LogicNode {
        id,
        statement,
        method,
        reason,
        node_type,
        children,
        is_proven: is_truthy(field(obj, PROVEN_FIELDS)),
    }
}

/// Sanitize a node sitting in root position; the position wins over the declared type.
pub fn sanitize_root(raw: &Value) -> LogicNode {
    let mut root = sanitize(raw);
    root.node_type = NodeType::Root;
    root
}

/// Coerce a JSON value into display text.
///
/// Strings pass through, numbers are stringified, arrays are joined line by
/// line, objects yield their first display field or a compact dump. Anything
/// else becomes the empty string.
pub fn coerce_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => format_number(n),
        Value::Array(items) => items
            .iter()
            .map(coerce_text)
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Object(obj) => {
            for key in DISPLAY_FIELDS {
                match obj.get(*key) {
                    Some(v @ (Value::String(_) | Value::Number(_))) => return coerce_text(v),
                    _ => continue,
                }
            }
            serde_json::to_string(value).unwrap_or_default()
        }
        Value::Null | Value::Bool(_) => String::new(),
    }
}

/// JavaScript-style truthiness.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn invalid_node() -> LogicNode {
    LogicNode {
        id: generate_node_id(),
        statement: INVALID_NODE_STATEMENT.to_string(),
        method: None,
        reason: None,
        node_type: NodeType::Node,
        children: Vec::new(),
        is_proven: false,
    }
}

fn field<'a>(obj: &'a Map<String, Value>, names: &[&str]) -> &'a Value {
    names
        .iter()
        .find_map(|name| obj.get(*name))
        .unwrap_or(&Value::Null)
}

fn non_blank(text: String) -> Option<String> {
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

fn format_number(n: &serde_json::Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        _ => n.to_string(),
    }
}
