//! # structon
//!
//! Schema-driven mapping between JSON documents and plain Rust structs, with
//! no derive macros and no serde data model in the middle.
//!
//! A struct's JSON shape is described once, as an ordered list of field
//! descriptors built by the [`schema!`] macro. The engines interpret that
//! description at runtime: decoding materializes a fresh value from a parsed
//! JSON tree, encoding projects a value back into a tree or text, and the
//! ownership system releases everything a decode allocated when the value
//! drops. `serde_json` supplies the JSON tree, parser and printer; this
//! crate supplies only the mapping.
//!
//! ## Why descriptors?
//!
//! Derive-based serialization fixes the mapping at the type definition.
//! A descriptor list is a value: it can live next to the struct, pick field
//! subsets, rename keys, and describe types you do not own. The trade-off
//! is that the mapping is interpreted, field by field, against the document.
//!
//! ## Quick start
//!
//! ```rust
//! use structon::{schema, from_str, to_string};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct User {
//!     id: i32,
//!     name: Option<String>,
//! }
//!
//! schema! {
//!     User {
//!         id: int,
//!         name: string,
//!     }
//! }
//!
//! let user = from_str::<User>(r#"{"id": 7, "name": "x"}"#).unwrap().unwrap();
//! assert_eq!(user.id, 7);
//! assert_eq!(user.name.as_deref(), Some("x"));
//!
//! // Keys render in descriptor order.
//! assert_eq!(to_string(&*user).unwrap(), r#"{"id":7,"name":"x"}"#);
//! ```
//!
//! ## Absence and defaults
//!
//! Every field is optional in the document. A missing key, a JSON `null`,
//! or (by default) a value of the wrong type leaves the field at its default:
//! zero for numbers, `false` for bools, `None` for strings and nested
//! aggregates, empty for lists. Decoding `{}` against any schema succeeds.
//! [`DecodeOptions::strict`] turns wrong-typed values into errors instead.
//!
//! A whole document decodes to `None` only when the root is JSON `null`;
//! encoding `None` produces JSON `null` in turn, so absence round-trips.
//!
//! ## Ownership
//!
//! Decoding returns `Option<Box<T>>`: one owned value graph whose strings,
//! nested aggregates and list nodes are ordinary owned fields. Dropping the
//! root releases everything exactly once. To let a subtree outlive its
//! parent, take it out first: `Option::take` / `std::mem::take` on the field,
//! or [`detach`] to do the same through the schema by key.
//!
//! Schemas themselves are built once per type (lazily) and shared; they are
//! `Send + Sync`, and the engines keep no state between calls.
//!
//! ## Allocator
//!
//! All allocations (value graphs, strings, list nodes, and the JSON trees
//! built by `serde_json`) go through the Rust global allocator, so a custom
//! `#[global_allocator]` covers the engine and the tree library at once.

#[macro_use]
mod macros;

pub mod error;
pub mod list;
pub mod options;
pub mod schema;

mod de;
mod ser;

pub use error::{Error, Result};
pub use list::NodeList;
pub use options::{DecodeOptions, EncodeOptions, MismatchPolicy};
pub use schema::{Field, Schema, SchemaBuilder, Schematic};

use serde_json::Value;
use std::io;

/// Decodes a value of type `T` from JSON text.
///
/// Returns `Ok(None)` when the document is JSON `null`. Field-level problems
/// default silently; see [`from_str_with_options`] for strict decoding.
///
/// # Examples
///
/// ```rust
/// use structon::{schema, from_str};
///
/// #[derive(Debug, Default)]
/// struct Point { x: i32, y: i32 }
///
/// schema! { Point { x: int, y: int } }
///
/// let point = from_str::<Point>(r#"{"x": 1, "y": 2}"#).unwrap().unwrap();
/// assert_eq!((point.x, point.y), (1, 2));
/// ```
///
/// # Errors
///
/// Returns [`Error::Malformed`] when the text is not valid JSON.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<T: Schematic>(input: &str) -> Result<Option<Box<T>>> {
    from_str_with_options(input, &DecodeOptions::default())
}

/// Decodes a value of type `T` from JSON text with explicit options.
///
/// # Errors
///
/// Returns [`Error::Malformed`] on unparseable text, [`Error::DepthExceeded`]
/// when nesting passes `options.max_depth`, and [`Error::Mismatch`] for
/// wrong-typed fields under [`MismatchPolicy::Strict`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str_with_options<T: Schematic>(
    input: &str,
    options: &DecodeOptions,
) -> Result<Option<Box<T>>> {
    let tree: Value = serde_json::from_str(input).map_err(Error::malformed)?;
    from_value_with_options(&tree, options)
}

/// Decodes a value of type `T` from JSON bytes.
///
/// # Errors
///
/// Returns [`Error::Malformed`] when the bytes are not valid UTF-8 JSON.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice<T: Schematic>(input: &[u8]) -> Result<Option<Box<T>>> {
    let tree: Value = serde_json::from_slice(input).map_err(Error::malformed)?;
    from_value_with_options(&tree, &DecodeOptions::default())
}

/// Decodes a value of type `T` from an I/O stream of JSON.
///
/// # Errors
///
/// Returns [`Error::Io`] when reading fails and [`Error::Malformed`] when
/// the stream contents are not valid JSON.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R, T>(mut reader: R) -> Result<Option<Box<T>>>
where
    R: io::Read,
    T: Schematic,
{
    let mut input = String::new();
    reader.read_to_string(&mut input).map_err(Error::io)?;
    from_str(&input)
}

/// Decodes a value of type `T` from an already-parsed JSON tree.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_value<T: Schematic>(node: &Value) -> Result<Option<Box<T>>> {
    from_value_with_options(node, &DecodeOptions::default())
}

/// Decodes a value of type `T` from an already-parsed JSON tree with
/// explicit options.
///
/// # Examples
///
/// ```rust
/// use structon::{schema, from_value_with_options, DecodeOptions, Error};
/// use serde_json::json;
///
/// #[derive(Debug, Default)]
/// struct Point { x: i32, y: i32 }
///
/// schema! { Point { x: int, y: int } }
///
/// // Lenient: the wrong-typed field defaults to zero.
/// let doc = json!({"x": "oops", "y": 2});
/// let point = from_value_with_options::<Point>(&doc, &DecodeOptions::new())
///     .unwrap()
///     .unwrap();
/// assert_eq!((point.x, point.y), (0, 2));
///
/// // Strict: the same document is an error.
/// let err = from_value_with_options::<Point>(&doc, &DecodeOptions::strict());
/// assert!(matches!(err, Err(Error::Mismatch { .. })));
/// ```
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_value_with_options<T: Schematic>(
    node: &Value,
    options: &DecodeOptions,
) -> Result<Option<Box<T>>> {
    Ok(de::decode_value(T::schema(), node, options, 0)?.map(|value| {
        match value.downcast::<T>() {
            Ok(value) => value,
            Err(_) => unreachable!(
                "schema `{}` produced a value of a foreign type",
                T::schema().name()
            ),
        }
    }))
}

/// Encodes a value of type `T` into a JSON tree.
///
/// `None` encodes to JSON `null`, mirroring the decode side, so an absent
/// value round-trips through the document.
///
/// # Examples
///
/// ```rust
/// use structon::{schema, to_value};
/// use serde_json::json;
///
/// #[derive(Debug, Default)]
/// struct Point { x: i32, y: i32 }
///
/// schema! { Point { x: int, y: int } }
///
/// let tree = to_value(Some(&Point { x: 1, y: 2 })).unwrap();
/// assert_eq!(tree, json!({"x": 1, "y": 2}));
///
/// assert_eq!(to_value::<Point>(None).unwrap(), json!(null));
/// ```
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_value<T: Schematic>(value: Option<&T>) -> Result<Value> {
    ser::encode_value(T::schema(), value.map(|value| value as &dyn std::any::Any))
}

/// Encodes a value to compact JSON text.
///
/// # Errors
///
/// Returns [`Error::Encode`] when the tree cannot be built or rendered.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T: Schematic>(value: &T) -> Result<String> {
    to_string_with_options(value, &EncodeOptions::default())
}

/// Encodes a value to pretty-printed JSON text.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_pretty<T: Schematic>(value: &T) -> Result<String> {
    to_string_with_options(value, &EncodeOptions::pretty())
}

/// Encodes a value to JSON text with explicit formatting and buffer options.
///
/// The intermediate tree is built, rendered into a buffer of
/// `options.buffer_capacity` bytes, and dropped whether rendering succeeds
/// or not.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options<T: Schematic>(value: &T, options: &EncodeOptions) -> Result<String> {
    let tree = to_value(Some(value))?;
    ser::render(&tree, options)
}

/// Encodes a value as compact JSON text into a writer.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: Schematic,
{
    to_writer_with_options(writer, value, &EncodeOptions::default())
}

/// Encodes a value as JSON text into a writer with explicit options.
///
/// # Errors
///
/// Returns [`Error::Io`] when the writer fails and [`Error::Encode`] when
/// the tree cannot be built.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer_with_options<W, T>(mut writer: W, value: &T, options: &EncodeOptions) -> Result<()>
where
    W: io::Write,
    T: Schematic,
{
    let text = to_string_with_options(value, options)?;
    writer.write_all(text.as_bytes()).map_err(Error::io)?;
    Ok(())
}

/// Takes the nested aggregate stored under `key` out of `value`, leaving
/// `None` behind.
///
/// This is the schema-driven form of `value.field.take()`, for callers that
/// address fields by JSON key. Returns `None` when the key does not name a
/// nested field of element type `C`, or the slot is already empty.
///
/// # Examples
///
/// ```rust
/// use structon::{schema, from_str, detach};
///
/// #[derive(Debug, Default)]
/// struct Engine { power: i32 }
///
/// schema! { Engine { power: int } }
///
/// #[derive(Debug, Default)]
/// struct Car { engine: Option<Box<Engine>> }
///
/// schema! { Car { engine: nested(Engine) } }
///
/// let mut car = from_str::<Car>(r#"{"engine": {"power": 90}}"#)
///     .unwrap()
///     .unwrap();
/// let engine: Box<Engine> = detach(&mut *car, "engine").unwrap();
/// assert_eq!(engine.power, 90);
/// assert!(car.engine.is_none());
/// ```
pub fn detach<T: Schematic, C: Schematic>(value: &mut T, key: &str) -> Option<Box<C>> {
    T::schema().detach(value, key)
}
