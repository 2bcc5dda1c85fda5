//! Error types for extxyz parsing and writing.
//!
//! Every failure is local and deterministic: the same input always fails the
//! same way, and no partial result is ever returned alongside an error.
//!
//! ## Error Categories
//!
//! - **Syntax Errors**: the comment-line grammar did not consume the whole line
//! - **Duplicate Keys**: a key appeared twice in one comment line
//! - **Shape Errors**: a `Lattice` (or a 2-D array) has an unusable shape
//! - **Schema Errors**: a malformed `Properties` value, or a data row that does
//!   not match the compiled row pattern
//! - **Column Count Errors**: a block has too few or too many data rows
//! - **Format Errors**: the writer was asked to emit something the format
//!   cannot represent
//!
//! ## Examples
//!
//! ```rust
//! use extxyz::{parse_comment_line, Error};
//!
//! let err = parse_comment_line("i 5").unwrap_err();
//! match err {
//!     Error::Syntax { position, expected, .. } => {
//!         assert_eq!(position, 0);
//!         assert!(expected.iter().any(|e| e == "="));
//!     }
//!     other => panic!("unexpected error {other}"),
//! }
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors raised while reading or writing extxyz data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The grammar failed to consume the entire line.
    ///
    /// `position` is the length of the longest prefix made of complete
    /// `key=value` pairs, `furthest` the byte offset where the last
    /// alternative gave up, and `expected` the token categories that would
    /// have allowed parsing to continue there.
    #[error("Syntax error: failed to parse entire line, only {parsed:?} (error at byte {furthest}); expecting one of: {}", .expected.join(", "))]
    Syntax {
        position: usize,
        furthest: usize,
        expected: Vec<String>,
        parsed: String,
    },

    /// The same key appeared more than once in a comment line.
    #[error("Duplicate key {key:?}")]
    DuplicateKey { key: String },

    /// A value has a shape that its key does not allow.
    #[error("Shape error for {key:?}: {msg} (shape {shape:?})")]
    Shape {
        key: String,
        shape: Vec<usize>,
        msg: String,
    },

    /// Malformed `Properties` value, or a data row that does not match the schema.
    #[error("Schema error{}: {msg}", .row.map(|r| format!(" at row {r}")).unwrap_or_default())]
    Schema { msg: String, row: Option<usize> },

    /// A block declared a different number of entries than it contained.
    #[error("Column count error: expected {expected} data rows, found {found}")]
    ColumnCount { expected: usize, found: usize },

    /// The writer cannot represent a value, or a format string is invalid.
    #[error("Format error: {0}")]
    Format(String),

    /// IO error while reading a stream
    #[error("IO error: {0}")]
    Io(String),
}

impl Error {
    /// Creates a syntax error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use extxyz::Error;
    ///
    /// let err = Error::syntax(0, 2, vec!["=".to_string()], "");
    /// assert!(err.to_string().contains("expecting one of: ="));
    /// ```
    pub fn syntax(position: usize, furthest: usize, expected: Vec<String>, parsed: &str) -> Self {
        Error::Syntax {
            position,
            furthest,
            expected,
            parsed: parsed.to_string(),
        }
    }

    /// Creates a duplicate key error.
    pub fn duplicate_key(key: &str) -> Self {
        Error::DuplicateKey {
            key: key.to_string(),
        }
    }

    /// Creates a shape error for `key`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use extxyz::Error;
    ///
    /// let err = Error::shape("Lattice", &[4], "expected 3, 9 or 3x3 elements");
    /// assert!(err.to_string().contains("Lattice"));
    /// ```
    pub fn shape(key: &str, shape: &[usize], msg: &str) -> Self {
        Error::Shape {
            key: key.to_string(),
            shape: shape.to_vec(),
            msg: msg.to_string(),
        }
    }

    /// Creates a schema error not tied to a particular data row.
    pub fn schema<T: fmt::Display>(msg: T) -> Self {
        Error::Schema {
            msg: msg.to_string(),
            row: None,
        }
    }

    /// Creates a schema error for data row `row` (0-based within its block).
    pub fn schema_at_row<T: fmt::Display>(row: usize, msg: T) -> Self {
        Error::Schema {
            msg: msg.to_string(),
            row: Some(row),
        }
    }

    /// Creates a column count error.
    pub fn column_count(expected: usize, found: usize) -> Self {
        Error::ColumnCount { expected, found }
    }

    /// Creates a writer format error.
    pub fn format<T: fmt::Display>(msg: T) -> Self {
        Error::Format(msg.to_string())
    }

    /// Creates an I/O error for stream reading failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Returns `true` for the syntax error variant.
    #[must_use]
    pub const fn is_syntax(&self) -> bool {
        matches!(self, Error::Syntax { .. })
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
