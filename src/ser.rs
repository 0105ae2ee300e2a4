//! The encode engine: native value graph to JSON tree and text.
//!
//! `encode_value` mirrors the decode engine: it walks a schema's descriptors
//! against a decoded (or hand-built) value and produces a JSON object whose
//! keys appear in descriptor order. Numeric and bool fields are always
//! emitted; empty string, raw, nested and list fields are omitted rather
//! than emitted as null; fixed arrays always emit their declared length.

use crate::options::EncodeOptions;
use crate::schema::{ArrayAccess, FieldKind, Schema};
use crate::{Error, Result};
use serde_json::{Map, Value};
use std::any::Any;

pub(crate) fn encode_value(schema: &Schema, value: Option<&dyn Any>) -> Result<Value> {
    let value = match value {
        Some(value) => value,
        None => return Ok(Value::Null),
    };

    let mut object = Map::new();
    for field in &schema.fields {
        let encoded = match &field.kind {
            FieldKind::Char { get, .. } => Some(Value::from(i64::from(get(value)))),
            FieldKind::Short { get, .. } => Some(Value::from(i64::from(get(value)))),
            FieldKind::Int { get, .. } => Some(Value::from(i64::from(get(value)))),
            FieldKind::Long { get, .. } => Some(Value::from(get(value))),
            // Non-finite numbers have no JSON form and render as null.
            FieldKind::Float { get, .. } => Some(Value::from(f64::from(get(value)))),
            FieldKind::Double { get, .. } => Some(Value::from(get(value))),
            FieldKind::Bool { get, .. } => Some(Value::Bool(get(value))),
            FieldKind::String { get, .. } => get(value).map(|text| Value::String(text.to_owned())),
            FieldKind::Json { get, .. } => match get(value) {
                // Stored text that no longer parses is dropped, the same
                // fate a failed subtree attach has.
                Some(text) => serde_json::from_str(text).ok(),
                None => None,
            },
            FieldKind::Nested { schema: element, get, .. } => match get(value) {
                Some(sub) => Some(encode_value(element(), Some(sub))?),
                None => None,
            },
            FieldKind::List { schema: element, visit, is_empty, .. } => {
                if is_empty(value) {
                    None
                } else {
                    let mut entries = Vec::new();
                    let mut failure = None;
                    visit(value, &mut |payload| {
                        if failure.is_some() {
                            return;
                        }
                        // Empty slots are skipped on the way out.
                        if let Some(payload) = payload {
                            match encode_value(element(), Some(payload)) {
                                Ok(entry) => entries.push(entry),
                                Err(error) => failure = Some(error),
                            }
                        }
                    });
                    if let Some(error) = failure {
                        return Err(error);
                    }
                    Some(Value::Array(entries))
                }
            }
            FieldKind::Array(access) => Some(encode_array(value, access)),
        };

        match (field.key, encoded) {
            (Some(key), Some(entry)) => {
                object.insert(key.to_string(), entry);
            }
            (Some(_), None) => {}
            // Self-describing descriptor: its value replaces the node.
            (None, entry) => return Ok(entry.unwrap_or(Value::Null)),
        }
    }
    Ok(Value::Object(object))
}

fn encode_array(value: &dyn Any, access: &ArrayAccess) -> Value {
    match access {
        ArrayAccess::Integer { len, get, .. } => {
            Value::Array((0..*len).map(|i| Value::from(get(value, i))).collect())
        }
        ArrayAccess::Floating { len, get, .. } => {
            Value::Array((0..*len).map(|i| Value::from(get(value, i))).collect())
        }
        ArrayAccess::String { len, get, .. } => Value::Array(
            (0..*len)
                .map(|i| {
                    get(value, i).map_or(Value::Null, |text| Value::String(text.to_owned()))
                })
                .collect(),
        ),
    }
}

/// Renders a finished tree to text, honoring the caller's buffer size hint
/// and format flag. The tree is dropped by the caller's scope whether or not
/// rendering succeeds.
pub(crate) fn render(tree: &Value, options: &EncodeOptions) -> Result<String> {
    let mut buffer = Vec::with_capacity(options.buffer_capacity);
    let rendered = if options.pretty {
        serde_json::to_writer_pretty(&mut buffer, tree)
    } else {
        serde_json::to_writer(&mut buffer, tree)
    };
    rendered.map_err(Error::encode)?;
    String::from_utf8(buffer).map_err(Error::encode)
}
