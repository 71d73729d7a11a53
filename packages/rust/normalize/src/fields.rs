//! Shape coercions over the generic tree.

use serde_json::Value;

use civis_shared::XML_TEXT_KEY;

/// View a possibly-missing node as a sequence.
///
/// Missing, `null` and empty-element (`""`) nodes are empty; an array is its
/// items; any other single node is a one-element sequence.
pub fn as_array(value: Option<&Value>) -> Vec<&Value> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::String(s)) if s.trim().is_empty() => Vec::new(),
        Some(Value::Array(items)) => items.iter().collect(),
        Some(other) => vec![other],
    }
}

/// Read a scalar node as a trimmed string.
///
/// Elements that carry attributes contribute their text node. Empty text,
/// arrays and plain objects read as `None`.
pub fn scalar_string(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Object(map) => return scalar_string(map.get(XML_TEXT_KEY)),
        Value::Null | Value::Array(_) => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// `scalar_string` of a named child, defaulting to the empty string.
pub(crate) fn text_or_empty(node: &Value, name: &str) -> String {
    scalar_string(node.get(name)).unwrap_or_default()
}
