//! `Properties` schemas and per-atom data rows.
//!
//! A `Properties` value such as `species:S:1:pos:R:3:forces:R:3` declares the
//! columns of every data row in a block. This module parses it into a
//! [`PropertiesSchema`], compiles that into a [`CompiledSchema`] (row regex and
//! column layout), and uses the compiled form to turn data rows into a
//! column-oriented [`Table`].
//!
//! ## Type codes
//!
//! | Code | Type    | Row pattern       |
//! |------|---------|-------------------|
//! | `R`  | float   | decimal or `e`/`d` exponent |
//! | `I`  | integer | optional sign, no leading zeros |
//! | `S`  | string  | any run of non-whitespace |
//! | `L`  | logical | `T`, `F`, `true`, `False`, ... |
//!
//! ## Examples
//!
//! ```rust
//! use extxyz::{PropertiesSchema, Value};
//!
//! let schema: PropertiesSchema = "species:S:1:pos:R:3".parse().unwrap();
//! let compiled = schema.compile().unwrap();
//!
//! let table = compiled.parse_rows(["Si 0.0 0.0 0.0", "O 1.5 0.0 0.5"]).unwrap();
//! assert_eq!(table.n_rows(), 2);
//! assert_eq!(table.get("species"), Some(&Value::from(vec!["Si", "O"])));
//! assert_eq!(table.get("pos").map(Value::shape), Some(vec![2, 3]));
//! ```

use crate::token::{BOOL_RE, FLOAT_RE, INTEGER_RE, SIMPLESTRING_RE, WHITESPACE_RE};
use crate::{Error, Matrix, Result, Value};
use indexmap::IndexMap;
use regex::Regex;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// Column type code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyType {
    #[serde(rename = "R")]
    Real,
    #[serde(rename = "I")]
    Integer,
    #[serde(rename = "S")]
    String,
    #[serde(rename = "L")]
    Logical,
}

impl PropertyType {
    /// All codes, in the order they are listed in a format dictionary.
    pub const ALL: [PropertyType; 4] = [
        PropertyType::Real,
        PropertyType::Integer,
        PropertyType::String,
        PropertyType::Logical,
    ];

    #[must_use]
    pub const fn code(self) -> char {
        match self {
            PropertyType::Real => 'R',
            PropertyType::Integer => 'I',
            PropertyType::String => 'S',
            PropertyType::Logical => 'L',
        }
    }

    #[must_use]
    pub const fn from_code(code: char) -> Option<Self> {
        match code {
            'R' => Some(PropertyType::Real),
            'I' => Some(PropertyType::Integer),
            'S' => Some(PropertyType::String),
            'L' => Some(PropertyType::Logical),
            _ => None,
        }
    }

    /// Regex fragment matching one cell of this type.
    #[must_use]
    pub const fn cell_pattern(self) -> &'static str {
        match self {
            PropertyType::Real => FLOAT_RE,
            PropertyType::Integer => INTEGER_RE,
            PropertyType::String => SIMPLESTRING_RE,
            PropertyType::Logical => BOOL_RE,
        }
    }

    /// Type code for a table column, judged from its element type.
    #[must_use]
    pub const fn of_value(value: &Value) -> Option<Self> {
        match value {
            Value::FloatArray(_) | Value::FloatMatrix(_) => Some(PropertyType::Real),
            Value::IntArray(_) | Value::IntMatrix(_) => Some(PropertyType::Integer),
            Value::StrArray(_) | Value::StrMatrix(_) => Some(PropertyType::String),
            Value::BoolArray(_) | Value::BoolMatrix(_) => Some(PropertyType::Logical),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// One `name:type:columns` entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertySpec {
    pub name: String,
    pub kind: PropertyType,
    pub columns: u32,
}

impl PropertySpec {
    pub fn new(name: impl Into<String>, kind: PropertyType, columns: u32) -> Self {
        PropertySpec {
            name: name.into(),
            kind,
            columns,
        }
    }
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// An ordered list of column declarations.
///
/// Parsed with [`str::parse`] and printed back with [`fmt::Display`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PropertiesSchema(Vec<PropertySpec>);

impl PropertiesSchema {
    pub const KEY: &'static str = "Properties";

    /// Schema used when a block has no `Properties` entry.
    pub const DEFAULT: &'static str = "species:S:1:pos:R:3";

    /// Upper bound on the cells a data row may declare.
    pub const MAX_COLUMNS: u64 = 4096;

    /// Builds a schema from its entries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] if the list is empty, a name is not an
    /// identifier or repeats, a column count is zero, or the row would hold
    /// more than [`MAX_COLUMNS`](Self::MAX_COLUMNS) cells.
    pub fn new(specs: Vec<PropertySpec>) -> Result<Self> {
        if specs.is_empty() {
            return Err(Error::schema("Properties must declare at least one column"));
        }
        for (i, spec) in specs.iter().enumerate() {
            if !is_valid_name(&spec.name) {
                return Err(Error::schema(format!("invalid property name {:?}", spec.name)));
            }
            if spec.columns == 0 {
                return Err(Error::schema(format!(
                    "property {:?} must have at least one column",
                    spec.name
                )));
            }
            if specs[..i].iter().any(|s| s.name == spec.name) {
                return Err(Error::schema(format!("duplicate property {:?}", spec.name)));
            }
        }
        let total: u64 = specs.iter().map(|s| u64::from(s.columns)).sum();
        if total > Self::MAX_COLUMNS {
            return Err(Error::schema(format!(
                "Properties declares {} columns, more than {}",
                total,
                Self::MAX_COLUMNS
            )));
        }
        Ok(PropertiesSchema(specs))
    }

    /// The schema applied to blocks without a `Properties` entry.
    #[must_use]
    pub fn default_schema() -> Self {
        PropertiesSchema(vec![
            PropertySpec::new("species", PropertyType::String, 1),
            PropertySpec::new("pos", PropertyType::Real, 3),
        ])
    }

    /// Derives a schema from the column names, element types and widths of `table`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] if a column is not an array or the table is empty.
    pub fn from_table(table: &Table) -> Result<Self> {
        let specs = table
            .iter()
            .map(|(name, value)| {
                let kind = PropertyType::of_value(value).ok_or_else(|| {
                    Error::schema(format!(
                        "column {:?} must be an array or matrix, found {}",
                        name,
                        value.type_name()
                    ))
                })?;
                let columns = match value.shape().as_slice() {
                    [_, cols] => *cols as u32,
                    _ => 1,
                };
                Ok(PropertySpec::new(name.as_str(), kind, columns))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(specs)
    }

    #[must_use]
    pub fn specs(&self) -> &[PropertySpec] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of whitespace-separated cells in a data row.
    #[must_use]
    pub fn n_columns(&self) -> usize {
        self.0.iter().map(|s| s.columns as usize).sum()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PropertySpec> {
        self.0.iter().find(|s| s.name == name)
    }

    /// Compiles the row regex and column layout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] if the row regex cannot be built.
    pub fn compile(&self) -> Result<CompiledSchema> {
        CompiledSchema::new(self.clone())
    }
}

impl fmt::Display for PropertiesSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, spec) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(":")?;
            }
            write!(f, "{}:{}:{}", spec.name, spec.kind, spec.columns)?;
        }
        Ok(())
    }
}

impl FromStr for PropertiesSchema {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let fields: Vec<&str> = s.split(':').collect();
        if fields.len() % 3 != 0 {
            return Err(Error::schema(format!(
                "expected name:type:columns triples, found {} fields",
                fields.len()
            )));
        }
        let specs = fields
            .chunks(3)
            .map(|triple| {
                let (name, code, columns) = (triple[0], triple[1], triple[2]);
                let kind = code
                    .chars()
                    .next()
                    .filter(|_| code.len() == 1)
                    .and_then(PropertyType::from_code)
                    .ok_or_else(|| {
                        Error::schema(format!("unknown type code {:?} for {:?}", code, name))
                    })?;
                if !columns.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(Error::schema(format!(
                        "invalid column count {:?} for {:?}",
                        columns, name
                    )));
                }
                let columns = columns.parse::<u32>().map_err(|_| {
                    Error::schema(format!("invalid column count {:?} for {:?}", columns, name))
                })?;
                Ok(PropertySpec::new(name, kind, columns))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(specs)
    }
}

/// Position of one property within a data row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnField {
    pub name: String,
    pub kind: PropertyType,
    /// Range of cell indices (and regex capture groups, offset by one).
    pub columns: Range<usize>,
}

impl ColumnField {
    #[must_use]
    pub fn width(&self) -> usize {
        self.columns.len()
    }
}

/// A single parsed data cell.
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

impl Cell {
    fn parse(kind: PropertyType, text: &str) -> Option<Self> {
        match kind {
            PropertyType::Real => text.replace(['d', 'D'], "e").parse().ok().map(Cell::Float),
            PropertyType::Integer => text.parse().ok().map(Cell::Int),
            PropertyType::String => Some(Cell::Str(text.to_string())),
            PropertyType::Logical => Some(Cell::Bool(text.starts_with(['T', 't']))),
        }
    }
}

/// A schema with its row regex and column layout, ready to parse rows.
///
/// Immutable; share it between blocks (and threads) behind an `Arc`.
#[derive(Clone, Debug)]
pub struct CompiledSchema {
    schema: PropertiesSchema,
    pattern: Regex,
    layout: Vec<ColumnField>,
    n_columns: usize,
}

impl PartialEq for CompiledSchema {
    fn eq(&self, other: &Self) -> bool {
        self.schema == other.schema
    }
}

impl CompiledSchema {
    /// Builds the row pattern for `schema`.
    ///
    /// One capture group per cell, separated by whitespace, anchored at both
    /// ends with optional surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] if the regex cannot be compiled.
    pub fn new(schema: PropertiesSchema) -> Result<Self> {
        let mut layout = Vec::with_capacity(schema.len());
        let mut groups = Vec::with_capacity(schema.n_columns());
        for spec in schema.specs() {
            let start = groups.len();
            for _ in 0..spec.columns {
                groups.push(format!("({})", spec.kind.cell_pattern()));
            }
            layout.push(ColumnField {
                name: spec.name.clone(),
                kind: spec.kind,
                columns: start..groups.len(),
            });
        }

        let source = format!(r"^\s*{}\s*$", groups.join(WHITESPACE_RE));
        let pattern = Regex::new(&source)
            .map_err(|e| Error::schema(format!("cannot compile row pattern: {}", e)))?;
        log::debug!("compiled Properties {} into {} columns", schema, groups.len());

        Ok(CompiledSchema {
            n_columns: groups.len(),
            schema,
            pattern,
            layout,
        })
    }

    #[must_use]
    pub fn schema(&self) -> &PropertiesSchema {
        &self.schema
    }

    #[must_use]
    pub fn row_pattern(&self) -> &Regex {
        &self.pattern
    }

    #[must_use]
    pub fn layout(&self) -> &[ColumnField] {
        &self.layout
    }

    #[must_use]
    pub fn n_columns(&self) -> usize {
        self.n_columns
    }

    /// Flat column names: `name` for single columns, `name0`, `name1`, ... otherwise.
    #[must_use]
    pub fn column_names(&self) -> Vec<String> {
        self.layout
            .iter()
            .flat_map(|field| {
                let width = field.width();
                (0..width).map(move |i| {
                    if width == 1 {
                        field.name.clone()
                    } else {
                        format!("{}{}", field.name, i)
                    }
                })
            })
            .collect()
    }

    /// Parses one data row into cells, in column order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] tagged with `row` if the line does not match
    /// the row pattern.
    pub fn parse_row(&self, row: usize, line: &str) -> Result<Vec<Cell>> {
        let captures = self.pattern.captures(line).ok_or_else(|| {
            Error::schema_at_row(
                row,
                format!(
                    "{:?} does not match Properties {} ({} columns)",
                    line, self.schema, self.n_columns
                ),
            )
        })?;

        let mut cells = Vec::with_capacity(self.n_columns);
        for field in &self.layout {
            for i in field.columns.clone() {
                let text = captures.get(i + 1).map_or("", |m| m.as_str());
                let cell = Cell::parse(field.kind, text).ok_or_else(|| {
                    Error::schema_at_row(
                        row,
                        format!("cannot convert {:?} for property {:?}", text, field.name),
                    )
                })?;
                cells.push(cell);
            }
        }
        Ok(cells)
    }

    /// Parses a block of data rows into a column table.
    ///
    /// # Errors
    ///
    /// Returns the first row that fails [`CompiledSchema::parse_row`].
    pub fn parse_rows<'a, I>(&self, rows: I) -> Result<Table>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut buffers: Vec<ColumnBuffer> = self
            .layout
            .iter()
            .map(|field| ColumnBuffer::new(field.kind))
            .collect();

        let mut n_rows = 0;
        for (row, line) in rows.into_iter().enumerate() {
            let mut cells = self.parse_row(row, line)?.into_iter();
            for (field, buffer) in self.layout.iter().zip(buffers.iter_mut()) {
                for cell in cells.by_ref().take(field.width()) {
                    buffer.push(cell);
                }
            }
            n_rows += 1;
        }

        let columns = self
            .layout
            .iter()
            .zip(buffers)
            .map(|(field, buffer)| Ok((field.name.clone(), buffer.finish(n_rows, field.width())?)))
            .collect::<Result<IndexMap<_, _>>>()?;
        Ok(Table { n_rows, columns })
    }
}

enum ColumnBuffer {
    Int(Vec<i64>),
    Float(Vec<f64>),
    Bool(Vec<bool>),
    Str(Vec<String>),
}

impl ColumnBuffer {
    fn new(kind: PropertyType) -> Self {
        match kind {
            PropertyType::Real => ColumnBuffer::Float(Vec::new()),
            PropertyType::Integer => ColumnBuffer::Int(Vec::new()),
            PropertyType::String => ColumnBuffer::Str(Vec::new()),
            PropertyType::Logical => ColumnBuffer::Bool(Vec::new()),
        }
    }

    fn push(&mut self, cell: Cell) {
        match (self, cell) {
            (ColumnBuffer::Int(v), Cell::Int(i)) => v.push(i),
            (ColumnBuffer::Float(v), Cell::Float(f)) => v.push(f),
            (ColumnBuffer::Bool(v), Cell::Bool(b)) => v.push(b),
            (ColumnBuffer::Str(v), Cell::Str(s)) => v.push(s),
            _ => {}
        }
    }

    fn finish(self, rows: usize, width: usize) -> Result<Value> {
        if width == 1 {
            return Ok(match self {
                ColumnBuffer::Int(v) => Value::IntArray(v),
                ColumnBuffer::Float(v) => Value::FloatArray(v),
                ColumnBuffer::Bool(v) => Value::BoolArray(v),
                ColumnBuffer::Str(v) => Value::StrArray(v),
            });
        }
        Ok(match self {
            ColumnBuffer::Int(v) => Value::IntMatrix(Matrix::from_row_major(rows, width, v)?),
            ColumnBuffer::Float(v) => Value::FloatMatrix(Matrix::from_row_major(rows, width, v)?),
            ColumnBuffer::Bool(v) => Value::BoolMatrix(Matrix::from_row_major(rows, width, v)?),
            ColumnBuffer::Str(v) => Value::StrMatrix(Matrix::from_row_major(rows, width, v)?),
        })
    }
}

/// Per-atom data of one block, as named columns.
///
/// Single-column properties are 1-D arrays with one entry per row; wider
/// properties are matrices with one row per data row.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    n_rows: usize,
    columns: IndexMap<String, Value>,
}

fn column_len(value: &Value) -> Option<usize> {
    match value.shape().as_slice() {
        [n] | [n, _] => Some(*n),
        _ => None,
    }
}

impl Table {
    /// Builds a table from named columns of equal length.
    ///
    /// # Errors
    ///
    /// - [`Error::Shape`] if a column is a scalar or differs in length
    /// - [`Error::DuplicateKey`] if a name repeats
    ///
    /// # Examples
    ///
    /// ```rust
    /// use extxyz::{Table, Value};
    ///
    /// let table = Table::from_columns(vec![
    ///     ("species".to_string(), Value::from(vec!["H", "H"])),
    ///     ("charge".to_string(), Value::from(vec![0.5, -0.5])),
    /// ])
    /// .unwrap();
    /// assert_eq!(table.n_rows(), 2);
    /// ```
    pub fn from_columns<I>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        let mut table = Table::default();
        for (i, (name, value)) in columns.into_iter().enumerate() {
            let len = column_len(&value)
                .ok_or_else(|| Error::shape(&name, &value.shape(), "table columns must be arrays"))?;
            if i == 0 {
                table.n_rows = len;
            } else if len != table.n_rows {
                return Err(Error::shape(
                    &name,
                    &value.shape(),
                    &format!("expected {} rows", table.n_rows),
                ));
            }
            if table.columns.contains_key(&name) {
                return Err(Error::duplicate_key(&name));
            }
            table.columns.insert(name, value);
        }
        Ok(table)
    }

    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.columns.iter()
    }

    #[must_use]
    pub fn into_columns(self) -> IndexMap<String, Value> {
        self.columns
    }
}

impl Serialize for Table {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (k, v) in &self.columns {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}
