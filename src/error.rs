//! Error types for schema-driven decoding and encoding.
//!
//! Field-level problems are not errors by default: when a key is missing or a
//! value has the wrong JSON type, the engine falls back to the field's
//! default value, and only [`MismatchPolicy::Strict`](crate::MismatchPolicy)
//! turns such values into [`Error::Mismatch`]. The variants here are reserved
//! for conditions that make the whole operation meaningless: unparseable
//! input, unrenderable output, exhausted recursion depth, stream failures.

use thiserror::Error;

/// Represents all possible errors produced while decoding or encoding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The input text is not valid JSON.
    #[error("malformed JSON input: {0}")]
    Malformed(String),

    /// A JSON tree could not be built or rendered to text.
    #[error("encoding failed: {0}")]
    Encode(String),

    /// Reading from or writing to a stream failed.
    #[error("IO error: {0}")]
    Io(String),

    /// Input nesting went past [`DecodeOptions::max_depth`](crate::DecodeOptions).
    #[error("nesting depth exceeds the configured limit of {limit}")]
    DepthExceeded {
        /// The configured limit that was hit.
        limit: usize,
    },

    /// Strict mode only: a value was present but had the wrong JSON type.
    ///
    /// Under the default lenient policy the field silently keeps its default
    /// value instead.
    #[error("field `{field}`: expected {expected}, found {found}")]
    Mismatch {
        /// JSON key of the offending field.
        field: String,
        /// What the schema declares.
        expected: &'static str,
        /// What the document contained.
        found: &'static str,
    },
}

impl Error {
    /// Creates a parse error from the underlying JSON parser's message.
    pub fn malformed(msg: impl std::fmt::Display) -> Self {
        Error::Malformed(msg.to_string())
    }

    /// Creates an encoding error.
    pub fn encode(msg: impl std::fmt::Display) -> Self {
        Error::Encode(msg.to_string())
    }

    /// Creates an I/O error for stream reading/writing failures.
    pub fn io(msg: impl std::fmt::Display) -> Self {
        Error::Io(msg.to_string())
    }

    /// Creates a strict-mode type mismatch error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use structon::Error;
    ///
    /// let err = Error::mismatch("age", "number", "string");
    /// assert!(err.to_string().contains("expected number"));
    /// ```
    pub fn mismatch(field: &str, expected: &'static str, found: &'static str) -> Self {
        Error::Mismatch {
            field: field.to_string(),
            expected,
            found,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
