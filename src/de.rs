//! The decode engine: JSON tree to native value graph.
//!
//! `decode_value` walks a schema's descriptors against one JSON node,
//! materializing a default value of the target aggregate and filling each
//! described field from the node's keyed children. Nested aggregates, lists
//! and fixed arrays recurse through the same entry point.
//!
//! Field lookups that miss, and values of the wrong JSON type, fall back to
//! the field's default under [`MismatchPolicy::Lenient`]; under `Strict`
//! they fail with [`Error::Mismatch`]. JSON `null` counts as absent in both
//! policies.

use crate::options::DecodeOptions;
use crate::schema::{ArrayAccess, FieldKind, Schema};
use crate::{Error, Result};
use serde_json::Value;
use std::any::Any;

pub(crate) fn decode_value(
    schema: &Schema,
    node: &Value,
    options: &DecodeOptions,
    depth: usize,
) -> Result<Option<Box<dyn Any>>> {
    if node.is_null() {
        return Ok(None);
    }
    if depth >= options.max_depth {
        return Err(Error::DepthExceeded {
            limit: options.max_depth,
        });
    }
    if options.mismatch.is_strict() && !schema.transparent && !node.is_object() {
        return Err(Error::mismatch(schema.name(), "object", kind_of(node)));
    }

    let mut value = (schema.new_boxed)();
    for field in &schema.fields {
        let label = field.label();
        match &field.kind {
            FieldKind::Char { set, .. } => {
                set(&mut *value, integer_at(node, field.key, label, options)? as i8)
            }
            FieldKind::Short { set, .. } => {
                set(&mut *value, integer_at(node, field.key, label, options)? as i16)
            }
            FieldKind::Int { set, .. } => {
                set(&mut *value, integer_at(node, field.key, label, options)? as i32)
            }
            FieldKind::Long { set, .. } => {
                set(&mut *value, integer_at(node, field.key, label, options)?)
            }
            FieldKind::Float { set, .. } => {
                set(&mut *value, floating_at(node, field.key, label, options)? as f32)
            }
            FieldKind::Double { set, .. } => {
                set(&mut *value, floating_at(node, field.key, label, options)?)
            }
            FieldKind::Bool { set, .. } => {
                set(&mut *value, boolean_at(node, field.key, label, options)?)
            }
            FieldKind::String { set, .. } => {
                set(&mut *value, string_at(node, field.key, label, options)?)
            }
            FieldKind::Json { set, .. } => set(&mut *value, raw_at(node, field.key)?),
            FieldKind::Nested { schema: element, set, .. } => {
                // A missing key short-circuits without recursing; a null
                // child becomes None inside the recursion.
                let sub = match item(node, field.key) {
                    Some(child) => decode_value(element(), child, options, depth + 1)?,
                    None => None,
                };
                set(&mut *value, sub);
            }
            FieldKind::List { schema: element, append, .. } => match item(node, field.key) {
                Some(Value::Array(entries)) => {
                    for entry in entries {
                        // Null entries append an empty slot so positions
                        // stay aligned with the source array.
                        let payload = decode_value(element(), entry, options, depth + 1)?;
                        append(&mut *value, payload);
                    }
                }
                Some(other) if options.mismatch.is_strict() && !other.is_null() => {
                    return Err(Error::mismatch(label, "array", kind_of(other)));
                }
                _ => {}
            },
            FieldKind::Array(access) => {
                decode_array(&mut *value, node, field.key, label, access, options)?
            }
        }
    }
    Ok(Some(value))
}

/// Resolves the JSON node a descriptor reads: the keyed child for a keyed
/// descriptor, the node itself for a self-describing one.
fn item<'a>(node: &'a Value, key: Option<&'static str>) -> Option<&'a Value> {
    match key {
        Some(key) => node.get(key),
        None => Some(node),
    }
}

fn integer_at(
    node: &Value,
    key: Option<&'static str>,
    label: &'static str,
    options: &DecodeOptions,
) -> Result<i64> {
    match item(node, key) {
        Some(Value::Number(number)) => Ok(number
            .as_i64()
            .or_else(|| number.as_f64().map(|f| f as i64))
            .unwrap_or(0)),
        Some(other) if options.mismatch.is_strict() && !other.is_null() => {
            Err(Error::mismatch(label, "number", kind_of(other)))
        }
        _ => Ok(0),
    }
}

fn floating_at(
    node: &Value,
    key: Option<&'static str>,
    label: &'static str,
    options: &DecodeOptions,
) -> Result<f64> {
    match item(node, key) {
        Some(Value::Number(number)) => Ok(number.as_f64().unwrap_or(0.0)),
        Some(other) if options.mismatch.is_strict() && !other.is_null() => {
            Err(Error::mismatch(label, "number", kind_of(other)))
        }
        _ => Ok(0.0),
    }
}

fn boolean_at(
    node: &Value,
    key: Option<&'static str>,
    label: &'static str,
    options: &DecodeOptions,
) -> Result<bool> {
    match item(node, key) {
        Some(Value::Bool(flag)) => Ok(*flag),
        Some(other) if options.mismatch.is_strict() && !other.is_null() => {
            Err(Error::mismatch(label, "boolean", kind_of(other)))
        }
        _ => Ok(false),
    }
}

fn string_at(
    node: &Value,
    key: Option<&'static str>,
    label: &'static str,
    options: &DecodeOptions,
) -> Result<Option<String>> {
    match item(node, key) {
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(other) if options.mismatch.is_strict() && !other.is_null() => {
            Err(Error::mismatch(label, "string", kind_of(other)))
        }
        _ => Ok(None),
    }
}

/// Re-renders the keyed subtree to compact text, keeping it verbatim for the
/// caller to decode later.
fn raw_at(node: &Value, key: Option<&'static str>) -> Result<Option<String>> {
    match item(node, key) {
        Some(child) => serde_json::to_string(child)
            .map(Some)
            .map_err(Error::encode),
        None => Ok(None),
    }
}

fn decode_array(
    value: &mut dyn Any,
    node: &Value,
    key: Option<&'static str>,
    label: &'static str,
    access: &ArrayAccess,
    options: &DecodeOptions,
) -> Result<()> {
    let child = match item(node, key) {
        Some(child) => child,
        None => return Ok(()),
    };
    let entries = match child {
        Value::Array(entries) => entries,
        other => {
            if options.mismatch.is_strict() && !other.is_null() {
                return Err(Error::mismatch(label, "array", kind_of(other)));
            }
            return Ok(());
        }
    };

    // Entries past the declared length are ignored; declared slots past the
    // JSON length keep their default value.
    match access {
        ArrayAccess::Integer { len, set, .. } => {
            for (i, entry) in entries.iter().take(*len).enumerate() {
                set(value, i, integer_at(entry, None, label, options)?);
            }
        }
        ArrayAccess::Floating { len, set, .. } => {
            for (i, entry) in entries.iter().take(*len).enumerate() {
                set(value, i, floating_at(entry, None, label, options)?);
            }
        }
        ArrayAccess::String { len, set, .. } => {
            for (i, entry) in entries.iter().take(*len).enumerate() {
                set(value, i, string_at(entry, None, label, options)?);
            }
        }
    }
    Ok(())
}

pub(crate) fn kind_of(node: &Value) -> &'static str {
    match node {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
