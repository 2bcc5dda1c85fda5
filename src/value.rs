//! Typed value representation for comment-line data.
//!
//! This module provides the [`Value`] enum which represents every value a
//! comment line can carry, together with the rectangular [`Matrix`] used by the
//! 2-D variants and the resolved [`Lattice`].
//!
//! ## Core Types
//!
//! - [`Value`]: scalars, 1-D arrays and 2-D matrices of int, float, bool or string
//! - [`Matrix`]: a row-major rectangular container
//! - [`Lattice`]: a resolved 3x3 float matrix
//!
//! ## Usage Patterns
//!
//! ### Creating Values
//!
//! ```rust
//! use extxyz::{Matrix, Value};
//!
//! let energy = Value::from(-12.5);
//! let pbc = Value::from(vec![true, true, false]);
//! let virial = Value::from(Matrix::from_rows(vec![vec![1.0, 0.0], vec![0.0, 1.0]]).unwrap());
//!
//! assert_eq!(pbc.shape(), vec![3]);
//! assert_eq!(virial.shape(), vec![2, 2]);
//! ```
//!
//! ### Extracting Values
//!
//! ```rust
//! use extxyz::Value;
//!
//! let value = Value::from(vec![1_i64, 2, 3]);
//! assert_eq!(value.as_int_array(), Some(&[1, 2, 3][..]));
//! assert_eq!(value.as_float(), None);
//! ```

use crate::{Error, Result};
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};
use std::fmt;

/// A rectangular, row-major 2-D container.
///
/// Construction rejects ragged input, so every row has [`Matrix::cols`]
/// elements.
///
/// # Examples
///
/// ```rust
/// use extxyz::Matrix;
///
/// let m = Matrix::from_rows(vec![vec![1, 2, 3], vec![4, 5, 6]]).unwrap();
/// assert_eq!((m.rows(), m.cols()), (2, 3));
/// assert_eq!(m.get(1, 0), Some(&4));
/// assert!(Matrix::from_rows(vec![vec![1, 2], vec![3]]).is_err());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T> Matrix<T> {
    /// Builds a matrix from a list of rows of equal length.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Shape`] if the rows differ in length.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        if let Some(bad) = rows.iter().find(|row| row.len() != cols) {
            return Err(Error::shape(
                "",
                &[rows.len(), bad.len()],
                &format!("ragged 2-D array, rows must all have {} elements", cols),
            ));
        }
        let n_rows = rows.len();
        let data = rows.into_iter().flatten().collect();
        Ok(Matrix {
            rows: n_rows,
            cols,
            data,
        })
    }

    /// Builds a matrix from row-major data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Shape`] if `data.len() != rows * cols`.
    pub fn from_row_major(rows: usize, cols: usize, data: Vec<T>) -> Result<Self> {
        if rows * cols != data.len() {
            return Err(Error::shape(
                "",
                &[data.len()],
                &format!("cannot reshape into {}x{}", rows, cols),
            ));
        }
        Ok(Matrix { rows, cols, data })
    }

    /// Builds a matrix from column-major (Fortran order) data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Shape`] if `data.len() != rows * cols`.
    pub fn from_column_major(rows: usize, cols: usize, data: Vec<T>) -> Result<Self>
    where
        T: Clone,
    {
        if rows * cols != data.len() {
            return Err(Error::shape(
                "",
                &[data.len()],
                &format!("cannot reshape into {}x{}", rows, cols),
            ));
        }
        let mut out = Vec::with_capacity(data.len());
        for i in 0..rows {
            for j in 0..cols {
                out.push(data[j * rows + i].clone());
            }
        }
        Ok(Matrix {
            rows,
            cols,
            data: out,
        })
    }

    #[inline]
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Returns the element at row `i`, column `j`.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> Option<&T> {
        if i < self.rows && j < self.cols {
            self.data.get(i * self.cols + j)
        } else {
            None
        }
    }

    /// Returns row `i` as a slice.
    #[must_use]
    pub fn row(&self, i: usize) -> Option<&[T]> {
        if i < self.rows {
            Some(&self.data[i * self.cols..(i + 1) * self.cols])
        } else {
            None
        }
    }

    /// Iterates over the rows in order.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[T]> {
        (0..self.rows).map(move |i| &self.data[i * self.cols..(i + 1) * self.cols])
    }

    /// Row-major element storage.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Applies `f` to every element, keeping the shape.
    pub fn map<U, F: FnMut(&T) -> U>(&self, f: F) -> Matrix<U> {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(f).collect(),
        }
    }

    /// Returns the transposed matrix.
    #[must_use]
    pub fn transpose(&self) -> Matrix<T>
    where
        T: Clone,
    {
        let mut data = Vec::with_capacity(self.data.len());
        for j in 0..self.cols {
            for i in 0..self.rows {
                data.push(self.data[i * self.cols + j].clone());
            }
        }
        Matrix {
            rows: self.cols,
            cols: self.rows,
            data,
        }
    }
}

impl<T: Serialize> Serialize for Matrix<T> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.rows))?;
        for row in self.iter_rows() {
            seq.serialize_element(row)?;
        }
        seq.end()
    }
}

/// A typed comment-line value.
///
/// Arrays are homogeneous: mixed input is promoted to a common element type
/// while parsing (see [`crate::extract`]).
///
/// # Examples
///
/// ```rust
/// use extxyz::{parse_comment_line, Value};
///
/// let line = parse_comment_line("a=[1, 2, 3.0] b=[1, \"a\", T] c=[T, F]").unwrap();
/// assert_eq!(line.info.get("a"), Some(&Value::FloatArray(vec![1.0, 2.0, 3.0])));
/// assert_eq!(line.info.get("b"), Some(&Value::from(vec!["1", "a", "T"])));
/// assert_eq!(line.info.get("c"), Some(&Value::BoolArray(vec![true, false])));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    IntArray(Vec<i64>),
    FloatArray(Vec<f64>),
    BoolArray(Vec<bool>),
    StrArray(Vec<String>),
    IntMatrix(Matrix<i64>),
    FloatMatrix(Matrix<f64>),
    BoolMatrix(Matrix<bool>),
    StrMatrix(Matrix<String>),
}

impl Value {
    /// Returns the array shape: `[]` for scalars, `[n]` for 1-D, `[rows, cols]` for 2-D.
    #[must_use]
    pub fn shape(&self) -> Vec<usize> {
        match self {
            Value::Int(_) | Value::Float(_) | Value::Bool(_) | Value::Str(_) => vec![],
            Value::IntArray(v) => vec![v.len()],
            Value::FloatArray(v) => vec![v.len()],
            Value::BoolArray(v) => vec![v.len()],
            Value::StrArray(v) => vec![v.len()],
            Value::IntMatrix(m) => vec![m.rows(), m.cols()],
            Value::FloatMatrix(m) => vec![m.rows(), m.cols()],
            Value::BoolMatrix(m) => vec![m.rows(), m.cols()],
            Value::StrMatrix(m) => vec![m.rows(), m.cols()],
        }
    }

    /// Short name of the variant, used in error messages.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Str(_) => "string",
            Value::IntArray(_) => "integer array",
            Value::FloatArray(_) => "float array",
            Value::BoolArray(_) => "bool array",
            Value::StrArray(_) => "string array",
            Value::IntMatrix(_) => "integer matrix",
            Value::FloatMatrix(_) => "float matrix",
            Value::BoolMatrix(_) => "bool matrix",
            Value::StrMatrix(_) => "string matrix",
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        matches!(
            self,
            Value::Int(_) | Value::Float(_) | Value::Bool(_) | Value::Str(_)
        )
    }

    #[inline]
    #[must_use]
    pub const fn is_matrix(&self) -> bool {
        matches!(
            self,
            Value::IntMatrix(_) | Value::FloatMatrix(_) | Value::BoolMatrix(_) | Value::StrMatrix(_)
        )
    }

    #[inline]
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as `f64`, widening integers.
    #[inline]
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_int_array(&self) -> Option<&[i64]> {
        match self {
            Value::IntArray(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_float_array(&self) -> Option<&[f64]> {
        match self {
            Value::FloatArray(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_bool_array(&self) -> Option<&[bool]> {
        match self {
            Value::BoolArray(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_str_array(&self) -> Option<&[String]> {
        match self {
            Value::StrArray(v) => Some(v),
            _ => None,
        }
    }

    /// Numeric content as a float matrix, if this is an int or float matrix.
    #[must_use]
    pub fn to_float_matrix(&self) -> Option<Matrix<f64>> {
        match self {
            Value::FloatMatrix(m) => Some(m.clone()),
            Value::IntMatrix(m) => Some(m.map(|&i| i as f64)),
            _ => None,
        }
    }

    /// Numeric content as a flat float vector, if this is an int or float array.
    #[must_use]
    pub fn to_float_vec(&self) -> Option<Vec<f64>> {
        match self {
            Value::FloatArray(v) => Some(v.clone()),
            Value::IntArray(v) => Some(v.iter().map(|&i| i as f64).collect()),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    /// Formats the value in comment-line syntax.
    ///
    /// Values the writer cannot represent (non-finite floats, empty arrays)
    /// produce [`fmt::Error`]; use [`crate::write_value`] to get a typed error.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = crate::ser::write_value(self).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Str(s) => serializer.serialize_str(s),
            Value::IntArray(v) => v.serialize(serializer),
            Value::FloatArray(v) => v.serialize(serializer),
            Value::BoolArray(v) => v.serialize(serializer),
            Value::StrArray(v) => v.serialize(serializer),
            Value::IntMatrix(m) => m.serialize(serializer),
            Value::FloatMatrix(m) => m.serialize(serializer),
            Value::BoolMatrix(m) => m.serialize(serializer),
            Value::StrMatrix(m) => m.serialize(serializer),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<Vec<i64>> for Value {
    fn from(value: Vec<i64>) -> Self {
        Value::IntArray(value)
    }
}

impl From<Vec<i32>> for Value {
    fn from(value: Vec<i32>) -> Self {
        Value::IntArray(value.into_iter().map(i64::from).collect())
    }
}

impl From<Vec<f64>> for Value {
    fn from(value: Vec<f64>) -> Self {
        Value::FloatArray(value)
    }
}

impl From<Vec<bool>> for Value {
    fn from(value: Vec<bool>) -> Self {
        Value::BoolArray(value)
    }
}

impl From<Vec<String>> for Value {
    fn from(value: Vec<String>) -> Self {
        Value::StrArray(value)
    }
}

impl From<Vec<&str>> for Value {
    fn from(value: Vec<&str>) -> Self {
        Value::StrArray(value.into_iter().map(str::to_string).collect())
    }
}

impl From<Matrix<i64>> for Value {
    fn from(value: Matrix<i64>) -> Self {
        Value::IntMatrix(value)
    }
}

impl From<Matrix<f64>> for Value {
    fn from(value: Matrix<f64>) -> Self {
        Value::FloatMatrix(value)
    }
}

impl From<Matrix<bool>> for Value {
    fn from(value: Matrix<bool>) -> Self {
        Value::BoolMatrix(value)
    }
}

impl From<Matrix<String>> for Value {
    fn from(value: Matrix<String>) -> Self {
        Value::StrMatrix(value)
    }
}

impl From<Lattice> for Value {
    fn from(value: Lattice) -> Self {
        Value::FloatMatrix(value.to_matrix())
    }
}

/// A resolved 3x3 float lattice.
///
/// Built from the `Lattice` comment-line entry, whose original shape may be
/// (3, 3), (3,) or (9,). See [`Lattice::from_value`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Lattice(pub [[f64; 3]; 3]);

impl Lattice {
    pub const KEY: &'static str = "Lattice";

    /// Diagonal lattice with the given lengths.
    #[must_use]
    pub const fn diagonal(a: f64, b: f64, c: f64) -> Self {
        Lattice([[a, 0.0, 0.0], [0.0, b, 0.0], [0.0, 0.0, c]])
    }

    /// Resolves a parsed `Lattice` value into a 3x3 float matrix.
    ///
    /// - shape (3, 3): used as-is, converted to float
    /// - shape (3,): diagonal matrix
    /// - shape (9,): reshaped column-major, then transposed
    ///
    /// # Errors
    ///
    /// Returns [`Error::Shape`] for any other shape or a non-numeric value.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use extxyz::{Lattice, Value};
    ///
    /// let lattice = Lattice::from_value(&Value::from(vec![2_i64, 3, 4])).unwrap();
    /// assert_eq!(lattice, Lattice::diagonal(2.0, 3.0, 4.0));
    /// ```
    pub fn from_value(value: &Value) -> Result<Self> {
        let shape = value.shape();
        if let Some(m) = value.to_float_matrix() {
            if m.rows() == 3 && m.cols() == 3 {
                return Ok(Self::from_row_major(m.as_slice()));
            }
        } else if let Some(v) = value.to_float_vec() {
            match v.len() {
                3 => return Ok(Self::diagonal(v[0], v[1], v[2])),
                9 => {
                    let m = Matrix::from_column_major(3, 3, v)?.transpose();
                    return Ok(Self::from_row_major(m.as_slice()));
                }
                _ => {}
            }
        } else {
            return Err(Error::shape(
                Self::KEY,
                &shape,
                &format!("expected a numeric array, found {}", value.type_name()),
            ));
        }
        Err(Error::shape(
            Self::KEY,
            &shape,
            "expected shape (3, 3), (3,) or (9,)",
        ))
    }

    fn from_row_major(data: &[f64]) -> Self {
        let mut out = [[0.0; 3]; 3];
        for (i, row) in out.iter_mut().enumerate() {
            row.copy_from_slice(&data[i * 3..i * 3 + 3]);
        }
        Lattice(out)
    }

    #[must_use]
    pub fn to_matrix(&self) -> Matrix<f64> {
        Matrix {
            rows: 3,
            cols: 3,
            data: self.0.iter().flatten().copied().collect(),
        }
    }

    #[must_use]
    pub fn transpose(&self) -> Self {
        let m = &self.0;
        Lattice([
            [m[0][0], m[1][0], m[2][0]],
            [m[0][1], m[1][1], m[2][1]],
            [m[0][2], m[1][2], m[2][2]],
        ])
    }
}

impl TryFrom<&Value> for Lattice {
    type Error = Error;

    fn try_from(value: &Value) -> Result<Self> {
        Lattice::from_value(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_column_major() {
        let m = Matrix::from_column_major(3, 3, (1..=9).collect::<Vec<i64>>()).unwrap();
        assert_eq!(m.row(0), Some(&[1, 4, 7][..]));
        assert_eq!(m.row(2), Some(&[3, 6, 9][..]));
    }

    #[test]
    fn test_matrix_transpose() {
        let m = Matrix::from_rows(vec![vec![1, 2, 3], vec![4, 5, 6]]).unwrap();
        let t = m.transpose();
        assert_eq!((t.rows(), t.cols()), (3, 2));
        assert_eq!(t.row(0), Some(&[1, 4][..]));
    }

    #[test]
    fn test_lattice_nine_elements() {
        let value = Value::IntArray((1..=9).collect());
        let lattice = Lattice::from_value(&value).unwrap();
        assert_eq!(
            lattice.0,
            [[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]]
        );
    }

    #[test]
    fn test_lattice_three_by_three_as_is() {
        let m = Matrix::from_rows(vec![vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 9]]).unwrap();
        let lattice = Lattice::from_value(&Value::IntMatrix(m)).unwrap();
        assert_eq!(lattice.0[0], [1.0, 2.0, 3.0]);
        assert_eq!(lattice.0[2], [7.0, 8.0, 9.0]);
    }

    #[test]
    fn test_lattice_bad_shapes() {
        for value in [
            Value::IntArray(vec![1, 2]),
            Value::Float(1.0),
            Value::Str("abc".to_string()),
            Value::BoolArray(vec![true, true, true]),
            Value::FloatMatrix(Matrix::from_rows(vec![vec![1.0, 2.0]]).unwrap()),
        ] {
            assert!(matches!(
                Lattice::from_value(&value),
                Err(Error::Shape { .. })
            ));
        }
    }

    #[test]
    fn test_shape() {
        assert!(Value::Int(1).shape().is_empty());
        assert_eq!(Value::from(vec![1.0, 2.0]).shape(), vec![2]);
    }
}
