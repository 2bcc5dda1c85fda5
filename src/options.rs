//! Configuration options for extxyz writing.
//!
//! This module provides types to customize writer output:
//!
//! - [`WriteOptions`]: Main configuration struct
//! - [`FormatDict`]: printf-style cell formats per column type
//!
//! ## Examples
//!
//! ```rust
//! use extxyz::{FormatDict, WriteOptions};
//!
//! // Fewer digits for positions, wider integer columns
//! let formats = FormatDict::new().with_real("%12.6f").with_integer("%6d");
//! let options = WriteOptions::new().with_formats(formats);
//!
//! // Fixed precision for floats on the comment line
//! let options = WriteOptions::new().with_float_precision(4);
//! assert_eq!(options.float_precision, Some(4));
//! ```

use crate::format::CellFormat;
use crate::properties::PropertyType;
use crate::Result;

/// Per-type cell formats used when writing data rows.
///
/// Logical cells are formatted from the strings `"True"` and `"False"`, so
/// the default `%.1s` writes `T` and `F`.
///
/// # Examples
///
/// ```rust
/// use extxyz::FormatDict;
/// use extxyz::properties::PropertyType;
///
/// let formats = FormatDict::new();
/// assert_eq!(formats.get(PropertyType::Real), "%16.8f");
/// assert_eq!(formats.get(PropertyType::Integer), "%8d");
/// assert_eq!(formats.get(PropertyType::String), "%s");
/// assert_eq!(formats.get(PropertyType::Logical), "%.1s");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct FormatDict {
    pub real: String,
    pub integer: String,
    pub string: String,
    pub logical: String,
}

impl Default for FormatDict {
    fn default() -> Self {
        FormatDict {
            real: "%16.8f".to_string(),
            integer: "%8d".to_string(),
            string: "%s".to_string(),
            logical: "%.1s".to_string(),
        }
    }
}

impl FormatDict {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_real(mut self, fmt: &str) -> Self {
        self.real = fmt.to_string();
        self
    }

    #[must_use]
    pub fn with_integer(mut self, fmt: &str) -> Self {
        self.integer = fmt.to_string();
        self
    }

    #[must_use]
    pub fn with_string(mut self, fmt: &str) -> Self {
        self.string = fmt.to_string();
        self
    }

    #[must_use]
    pub fn with_logical(mut self, fmt: &str) -> Self {
        self.logical = fmt.to_string();
        self
    }

    /// Returns the format string for `kind`.
    #[must_use]
    pub fn get(&self, kind: PropertyType) -> &str {
        match kind {
            PropertyType::Real => &self.real,
            PropertyType::Integer => &self.integer,
            PropertyType::String => &self.string,
            PropertyType::Logical => &self.logical,
        }
    }

    /// Parses the format string for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Format`] if the string is not a supported format.
    pub fn compile(&self, kind: PropertyType) -> Result<CellFormat> {
        CellFormat::parse(self.get(kind))
    }
}

/// Configuration options for extxyz writing.
///
/// # Examples
///
/// ```rust
/// use extxyz::WriteOptions;
///
/// let options = WriteOptions::new();
/// assert_eq!(options.float_precision, None);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WriteOptions {
    /// Digits after the decimal point for comment-line floats. `None` writes
    /// the shortest text that reads back to the same value.
    pub float_precision: Option<usize>,
    pub formats: FormatDict,
}

impl WriteOptions {
    /// Creates default options (shortest round-trip floats, default cell formats).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes comment-line floats with a fixed number of decimals.
    #[must_use]
    pub fn with_float_precision(mut self, precision: usize) -> Self {
        self.float_precision = Some(precision);
        self
    }

    /// Sets the cell formats used for data rows.
    #[must_use]
    pub fn with_formats(mut self, formats: FormatDict) -> Self {
        self.formats = formats;
        self
    }
}
