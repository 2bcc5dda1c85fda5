//! extxyz writing.
//!
//! This module provides the [`Serializer`] that turns values, documents and
//! comment lines back into comment-line text, and [`write_rows`] for data rows.
//!
//! ## Overview
//!
//! Output always reads back to the same values:
//!
//! - **Strings** are bare unless they contain whitespace or one of
//!   `= " , [ ] { } \`, are empty, or would read back as a number or bool;
//!   those are double-quoted with `\"`, `\\` and `\n` escaped
//! - **Arrays** use the bracketed form `[1, 2, 3]`, matrices `[[1, 2], [3, 4]]`
//! - **Bools** are written `T` and `F`
//! - **Floats** always carry a `.` or exponent so they never read back as integers
//!
//! ## Usage
//!
//! ```rust
//! use extxyz::{document, write_document};
//!
//! let doc = document! {
//!     "energy" => -1.5,
//!     "config_type" => "bulk fcc",
//!     "pbc" => vec![true, true, false],
//! };
//! assert_eq!(
//!     write_document(&doc).unwrap(),
//!     r#"energy=-1.5 config_type="bulk fcc" pbc=[T, T, F]"#
//! );
//! ```
//!
//! ## Direct Serializer Usage
//!
//! ```rust
//! use extxyz::{Serializer, Value, WriteOptions};
//!
//! let mut serializer = Serializer::new(WriteOptions::new().with_float_precision(3));
//! serializer.write_value(&Value::from(vec![0.5, 2.0])).unwrap();
//! assert_eq!(serializer.into_inner(), "[0.500, 2.000]");
//! ```

use crate::format::FormatArg;
use crate::properties::{CompiledSchema, PropertyType, Table};
use crate::token::{self, is_reserved, TokenKind};
use crate::{CommentLine, Document, Error, Lattice, Matrix, PropertiesSchema, Result, Value};

/// The comment-line writer.
pub struct Serializer {
    output: String,
    options: crate::WriteOptions,
}

/// Whether `s`, read as a whole, is a single integer, float or bool token.
fn is_literal(s: &str) -> bool {
    [token::integer, token::float, token::boolean]
        .iter()
        .any(|scan| scan(s, 0).map_or(false, |tok| tok.span.end == s.len()))
}

/// Whether a double-quoted `s` would read back as a legacy array instead of a
/// string: whitespace-separated literals that promote to one type.
fn reads_as_legacy_array(s: &str) -> bool {
    let mut kinds = s.split_whitespace().map(|piece| {
        if !is_literal(piece) {
            None
        } else if token::integer(piece, 0).map_or(false, |t| t.span.end == piece.len()) {
            Some(TokenKind::Integer)
        } else if token::float(piece, 0).map_or(false, |t| t.span.end == piece.len()) {
            Some(TokenKind::Float)
        } else {
            Some(TokenKind::Bool)
        }
    });
    let Some(Some(first)) = kinds.next() else {
        return false;
    };
    let numeric = |k: TokenKind| matches!(k, TokenKind::Integer | TokenKind::Float);
    kinds.all(|k| match k {
        Some(k) => k == first || (numeric(k) && numeric(first)),
        None => false,
    })
}

#[inline]
fn needs_quotes(s: &str) -> bool {
    s.is_empty() || s.chars().any(is_reserved) || is_literal(s)
}

impl Serializer {
    pub fn new(options: crate::WriteOptions) -> Self {
        Serializer {
            output: String::with_capacity(256),
            options,
        }
    }

    pub fn into_inner(self) -> String {
        self.output
    }

    /// Writes a string or key. Inside arrays, quoting alone keeps a string a
    /// string; at the top level a quoted literal would be taken for a legacy
    /// array, so its first character is also escaped.
    fn write_string(&mut self, s: &str, in_array: bool) {
        if !needs_quotes(s) {
            self.output.push_str(s);
            return;
        }
        let mut escape_first = !in_array && reads_as_legacy_array(s);
        self.output.push('"');
        for ch in s.chars() {
            match ch {
                '"' => self.output.push_str("\\\""),
                '\\' => self.output.push_str("\\\\"),
                '\n' => self.output.push_str("\\n"),
                c if escape_first && !c.is_whitespace() => {
                    self.output.push('\\');
                    self.output.push(c);
                    escape_first = false;
                }
                c => self.output.push(c),
            }
        }
        self.output.push('"');
    }

    fn write_int(&mut self, v: i64) {
        self.output.push_str(&v.to_string());
    }

    fn write_float(&mut self, v: f64) -> Result<()> {
        if !v.is_finite() {
            return Err(Error::format(format!(
                "cannot write non-finite float {} on the comment line",
                v
            )));
        }
        let text = match self.options.float_precision {
            Some(p) => format!("{:.*}", p, v),
            None => format!("{:?}", v),
        };
        self.output.push_str(&text);
        if !text.contains(['.', 'e', 'E']) {
            self.output.push('.');
        }
        Ok(())
    }

    fn write_bool(&mut self, v: bool) {
        self.output.push(if v { 'T' } else { 'F' });
    }

    fn write_array<T>(
        &mut self,
        items: &[T],
        mut each: impl FnMut(&mut Self, &T) -> Result<()>,
    ) -> Result<()> {
        if items.is_empty() {
            return Err(Error::format("cannot write an empty array"));
        }
        self.output.push('[');
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.output.push_str(", ");
            }
            each(self, item)?;
        }
        self.output.push(']');
        Ok(())
    }

    fn write_matrix<T>(
        &mut self,
        matrix: &Matrix<T>,
        mut each: impl FnMut(&mut Self, &T) -> Result<()>,
    ) -> Result<()> {
        if matrix.rows() == 0 || matrix.cols() == 0 {
            return Err(Error::format("cannot write an empty matrix"));
        }
        self.output.push('[');
        for (i, row) in matrix.iter_rows().enumerate() {
            if i > 0 {
                self.output.push_str(", ");
            }
            self.write_array(row, &mut each)?;
        }
        self.output.push(']');
        Ok(())
    }

    /// Writes a value in comment-line syntax.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Format`] for non-finite floats and empty arrays.
    pub fn write_value(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Int(i) => self.write_int(*i),
            Value::Float(f) => self.write_float(*f)?,
            Value::Bool(b) => self.write_bool(*b),
            Value::Str(s) => self.write_string(s, false),
            Value::IntArray(v) => self.write_array(v, |s, i| {
                s.write_int(*i);
                Ok(())
            })?,
            Value::FloatArray(v) => self.write_array(v, |s, f| s.write_float(*f))?,
            Value::BoolArray(v) => self.write_array(v, |s, b| {
                s.write_bool(*b);
                Ok(())
            })?,
            Value::StrArray(v) => self.write_array(v, |s, x| {
                s.write_string(x, true);
                Ok(())
            })?,
            Value::IntMatrix(m) => self.write_matrix(m, |s, i| {
                s.write_int(*i);
                Ok(())
            })?,
            Value::FloatMatrix(m) => self.write_matrix(m, |s, f| s.write_float(*f))?,
            Value::BoolMatrix(m) => self.write_matrix(m, |s, b| {
                s.write_bool(*b);
                Ok(())
            })?,
            Value::StrMatrix(m) => self.write_matrix(m, |s, x| {
                s.write_string(x, true);
                Ok(())
            })?,
        }
        Ok(())
    }

    fn write_separator(&mut self) {
        if !self.output.is_empty() {
            self.output.push(' ');
        }
    }

    /// Writes `key=value`, preceded by a space unless it is the first pair.
    pub fn write_pair(&mut self, key: &str, value: &Value) -> Result<()> {
        self.write_separator();
        self.write_string(key, false);
        self.output.push('=');
        self.write_value(value)
    }

    /// Writes every entry of `doc` in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Format`] if `doc` holds a `Lattice` or `Properties`
    /// key in any letter case, which would be read back as the reserved
    /// field rather than an info entry.
    pub fn write_document(&mut self, doc: &Document) -> Result<()> {
        for key in [Lattice::KEY, PropertiesSchema::KEY] {
            if let Some((found, _)) = doc.get_ignore_case(key) {
                return Err(Error::format(format!(
                    "info key {:?} is reserved; set the {} field instead",
                    found,
                    key.to_lowercase()
                )));
            }
        }
        for (key, value) in doc {
            self.write_pair(key, value)?;
        }
        Ok(())
    }

    pub fn write_lattice(&mut self, lattice: &Lattice) -> Result<()> {
        self.write_pair(Lattice::KEY, &Value::from(*lattice))
    }

    pub fn write_properties(&mut self, schema: &PropertiesSchema) {
        self.write_separator();
        self.output.push_str(PropertiesSchema::KEY);
        self.output.push('=');
        self.output.push_str(&schema.to_string());
    }

    /// Writes the info pairs, then `Lattice`, then `Properties`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Format`] if `info` itself holds a `Lattice` or
    /// `Properties` key (see [`write_document`](Self::write_document)).
    pub fn write_comment_line(&mut self, line: &CommentLine) -> Result<()> {
        self.write_document(&line.info)?;
        if let Some(lattice) = &line.lattice {
            self.write_lattice(lattice)?;
        }
        if let Some(schema) = &line.properties {
            self.write_properties(schema);
        }
        Ok(())
    }
}

/// Writes a single value in comment-line syntax.
///
/// # Examples
///
/// ```rust
/// use extxyz::{write_value, Matrix, Value};
///
/// let m = Matrix::from_rows(vec![vec![1, 2], vec![3, 4]]).unwrap();
/// assert_eq!(write_value(&Value::from(m)).unwrap(), "[[1, 2], [3, 4]]");
/// assert_eq!(write_value(&Value::from(2.0)).unwrap(), "2.0");
/// assert_eq!(write_value(&Value::from("3")).unwrap(), r#""\3""#);
/// assert!(write_value(&Value::from(f64::NAN)).is_err());
/// ```
pub fn write_value(value: &Value) -> Result<String> {
    let mut serializer = Serializer::new(crate::WriteOptions::default());
    serializer.write_value(value)?;
    Ok(serializer.into_inner())
}

/// Writes a document as space-separated `key=value` pairs.
///
/// # Errors
///
/// Returns [`Error::Format`] for a reserved `Lattice` or `Properties` key or
/// a value that cannot be written.
pub fn write_document(doc: &Document) -> Result<String> {
    let mut serializer = Serializer::new(crate::WriteOptions::default());
    serializer.write_document(doc)?;
    Ok(serializer.into_inner())
}

/// Writes a full comment line with default options. No trailing newline.
pub fn write_comment_line(line: &CommentLine) -> Result<String> {
    write_comment_line_with_options(line, &crate::WriteOptions::default())
}

pub fn write_comment_line_with_options(
    line: &CommentLine,
    options: &crate::WriteOptions,
) -> Result<String> {
    let mut serializer = Serializer::new(options.clone());
    serializer.write_comment_line(line)?;
    Ok(serializer.into_inner())
}

fn cell<'a>(column: &'a Value, row: usize, col: usize) -> Option<FormatArg<'a>> {
    let logical = |b: bool| FormatArg::Str(if b { "True" } else { "False" });
    match column {
        Value::IntArray(v) => v.get(row).map(|&i| FormatArg::Int(i)),
        Value::FloatArray(v) => v.get(row).map(|&f| FormatArg::Float(f)),
        Value::BoolArray(v) => v.get(row).map(|&b| logical(b)),
        Value::StrArray(v) => v.get(row).map(|s| FormatArg::Str(s)),
        Value::IntMatrix(m) => m.get(row, col).map(|&i| FormatArg::Int(i)),
        Value::FloatMatrix(m) => m.get(row, col).map(|&f| FormatArg::Float(f)),
        Value::BoolMatrix(m) => m.get(row, col).map(|&b| logical(b)),
        Value::StrMatrix(m) => m.get(row, col).map(|s| FormatArg::Str(s)),
        _ => None,
    }
}

/// Writes the data rows of `table` in `schema` column order, one line per row
/// with cells separated by a single space. No trailing newline.
///
/// # Errors
///
/// Returns [`Error::Format`] if a schema column is missing from the table or
/// has the wrong type or width, a string cell is empty or contains
/// whitespace, or a format string is invalid.
///
/// # Examples
///
/// ```rust
/// use extxyz::{write_rows, FormatDict, PropertiesSchema};
///
/// let compiled = PropertiesSchema::default_schema().compile().unwrap();
/// let table = compiled.parse_rows(["H 0 0 1.5"]).unwrap();
/// let formats = FormatDict::new().with_real("%.2f");
/// assert_eq!(write_rows(&compiled, &table, &formats).unwrap(), "H 0.00 0.00 1.50");
/// ```
pub fn write_rows(schema: &CompiledSchema, table: &Table, formats: &crate::FormatDict) -> Result<String> {
    let n_rows = table.n_rows();
    let mut columns = Vec::with_capacity(schema.layout().len());
    for field in schema.layout() {
        let column = table
            .get(&field.name)
            .ok_or_else(|| Error::format(format!("table has no column {:?}", field.name)))?;
        let expected_shape = if field.width() == 1 {
            vec![n_rows]
        } else {
            vec![n_rows, field.width()]
        };
        if PropertyType::of_value(column) != Some(field.kind) || column.shape() != expected_shape {
            return Err(Error::format(format!(
                "column {:?} is a {} of shape {:?}, expected {} data of shape {:?}",
                field.name,
                column.type_name(),
                column.shape(),
                field.kind,
                expected_shape
            )));
        }
        columns.push((field, column, formats.compile(field.kind)?));
    }

    let mut lines = Vec::with_capacity(n_rows);
    for row in 0..n_rows {
        let mut cells = Vec::with_capacity(schema.n_columns());
        for (field, column, format) in &columns {
            for col in 0..field.width() {
                let arg = cell(column, row, col).ok_or_else(|| {
                    Error::format(format!("column {:?} has no cell ({}, {})", field.name, row, col))
                })?;
                if let (PropertyType::String, FormatArg::Str(s)) = (field.kind, arg) {
                    if s.is_empty() || s.contains(char::is_whitespace) {
                        return Err(Error::format(format!(
                            "string cell {:?} in column {:?} cannot be written as a data cell",
                            s, field.name
                        )));
                    }
                }
                cells.push(format.apply(&arg)?);
            }
        }
        lines.push(cells.join(" "));
    }
    Ok(lines.join("\n"))
}
