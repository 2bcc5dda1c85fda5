//! Conversion of parsed pairs into typed values.
//!
//! The grammar in [`crate::de`] only decides the *shape* of each value. This
//! module decides its *type* and applies the post-parse rules:
//!
//! - element types are promoted across an array: all integers stay integers,
//!   integers mixed with floats become floats, and any other mix becomes an
//!   array of strings holding each element's literal text
//! - a legacy array with a single element collapses to that scalar
//! - a legacy array with nine elements becomes a 3x3 matrix in column-major
//!   order, except under `Lattice`
//! - `Lattice` is turned into a [`Lattice`] and `Properties` into a
//!   [`PropertiesSchema`]; both are pulled out of the info map

use crate::de::{Node, Pair, Parser};
use crate::token::{Token, TokenKind};
use crate::{Document, Error, Lattice, Matrix, PropertiesSchema, Result, Value};

/// The promoted element type of an array.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementKind {
    Int,
    Float,
    Bool,
    Str,
}

impl ElementKind {
    fn of(token: &Token<'_>) -> Self {
        match token.kind {
            TokenKind::Integer => ElementKind::Int,
            TokenKind::Float => ElementKind::Float,
            TokenKind::Bool => ElementKind::Bool,
            TokenKind::BareString | TokenKind::QuotedString(_) => ElementKind::Str,
        }
    }

    fn join(self, other: Self) -> Self {
        use ElementKind::*;
        match (self, other) {
            (a, b) if a == b => a,
            (Int, Float) | (Float, Int) => Float,
            _ => Str,
        }
    }
}

/// Returns the type every element of `tokens` can be represented as.
///
/// An empty slice promotes to [`ElementKind::Str`].
#[must_use]
pub fn promote(tokens: &[Token<'_>]) -> ElementKind {
    tokens
        .iter()
        .map(ElementKind::of)
        .reduce(ElementKind::join)
        .unwrap_or(ElementKind::Str)
}

/// A parsed comment line.
///
/// `info` holds every pair except `Lattice` and `Properties`, in the order
/// they appeared.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CommentLine {
    pub info: Document,
    pub lattice: Option<Lattice>,
    pub properties: Option<PropertiesSchema>,
}

impl CommentLine {
    #[must_use]
    pub fn new(info: Document) -> Self {
        CommentLine {
            info,
            lattice: None,
            properties: None,
        }
    }

    #[must_use]
    pub fn with_lattice(mut self, lattice: Lattice) -> Self {
        self.lattice = Some(lattice);
        self
    }

    #[must_use]
    pub fn with_properties(mut self, properties: PropertiesSchema) -> Self {
        self.properties = Some(properties);
        self
    }
}

/// Parses an extended XYZ comment line.
///
/// # Errors
///
/// - [`Error::Syntax`] if the line is not a sequence of `key=value` pairs
/// - [`Error::DuplicateKey`] if a key repeats (`Lattice` and `Properties`
///   are compared ignoring case)
/// - [`Error::Shape`] for a ragged 2-D array or a badly shaped `Lattice`
/// - [`Error::Schema`] for a malformed `Properties` value
///
/// # Examples
///
/// ```rust
/// use extxyz::{parse_comment_line, Value};
///
/// let line = parse_comment_line(r#"Lattice="5 0 0 0 5 0 0 0 5" energy=-3.5 pbc="T T T""#).unwrap();
/// assert_eq!(line.info.get("energy"), Some(&Value::Float(-3.5)));
/// assert_eq!(line.info.get("pbc"), Some(&Value::BoolArray(vec![true, true, true])));
/// assert_eq!(line.lattice.unwrap().0[1], [0.0, 5.0, 0.0]);
/// ```
pub fn parse_comment_line(line: &str) -> Result<CommentLine> {
    let pairs = Parser::new(line).parse()?;
    extract(pairs)
}

/// Builds a [`CommentLine`] from grammar output.
pub fn extract(pairs: Vec<Pair<'_>>) -> Result<CommentLine> {
    let mut line = CommentLine::new(Document::with_capacity(pairs.len()));

    for pair in pairs {
        let key = pair.key.string_value();
        match pair.value {
            Node::Properties(schema) => {
                if line.properties.is_some() {
                    return Err(Error::duplicate_key(&key));
                }
                line.properties = Some(schema);
            }
            node => {
                let value = evaluate(&key, node)?;
                if key.eq_ignore_ascii_case(Lattice::KEY) {
                    if line.lattice.is_some() {
                        return Err(Error::duplicate_key(&key));
                    }
                    line.lattice = Some(Lattice::from_value(&value)?);
                } else {
                    line.info.try_insert(key, value)?;
                }
            }
        }
    }
    Ok(line)
}

/// Converts a single node to a [`Value`], applying promotion and legacy-array rules.
pub fn evaluate(key: &str, node: Node<'_>) -> Result<Value> {
    match node {
        Node::Scalar(token) => Ok(scalar_value(&token)),
        Node::Array(tokens) => Ok(array_value(&tokens)),
        Node::LegacyArray(tokens) => {
            if tokens.len() == 1 {
                Ok(scalar_value(&tokens[0]))
            } else if tokens.len() == 9 && !key.eq_ignore_ascii_case(Lattice::KEY) {
                let rows: Vec<Vec<Token<'_>>> = (0..3)
                    .map(|r| (0..3).map(|c| tokens[c * 3 + r].clone()).collect())
                    .collect();
                matrix_value(key, &rows)
            } else {
                Ok(array_value(&tokens))
            }
        }
        Node::NestedArray(rows) => matrix_value(key, &rows),
        Node::Properties(schema) => Ok(Value::Str(schema.to_string())),
    }
}

fn scalar_value(token: &Token<'_>) -> Value {
    match ElementKind::of(token) {
        ElementKind::Int => token.int_value().map(Value::Int),
        ElementKind::Float => token.float_value().map(Value::Float),
        ElementKind::Bool => token.bool_value().map(Value::Bool),
        ElementKind::Str => None,
    }
    .unwrap_or_else(|| Value::Str(token.string_value()))
}

fn convert<'t, T>(tokens: &[Token<'t>], f: fn(&Token<'t>) -> Option<T>) -> Option<Vec<T>> {
    tokens.iter().map(f).collect()
}

fn strings(tokens: &[Token<'_>]) -> Vec<String> {
    tokens.iter().map(Token::string_value).collect()
}

fn array_value(tokens: &[Token<'_>]) -> Value {
    match promote(tokens) {
        ElementKind::Int => convert(tokens, Token::int_value).map(Value::IntArray),
        ElementKind::Float => convert(tokens, Token::float_value).map(Value::FloatArray),
        ElementKind::Bool => convert(tokens, Token::bool_value).map(Value::BoolArray),
        ElementKind::Str => None,
    }
    .unwrap_or_else(|| Value::StrArray(strings(tokens)))
}

fn matrix_rows<'t, T>(
    rows: &[Vec<Token<'t>>],
    f: fn(&Token<'t>) -> Option<T>,
) -> Option<Vec<Vec<T>>> {
    rows.iter().map(|row| convert(row, f)).collect()
}

fn matrix_value(key: &str, rows: &[Vec<Token<'_>>]) -> Result<Value> {
    let cols = rows.first().map_or(0, Vec::len);
    if let Some(bad) = rows.iter().find(|row| row.len() != cols) {
        return Err(Error::shape(
            key,
            &[rows.len(), bad.len()],
            &format!("rows of a 2-D array must all have {} elements", cols),
        ));
    }

    let all: Vec<Token<'_>> = rows.iter().flatten().cloned().collect();
    let value = match promote(&all) {
        ElementKind::Int => matrix_rows(rows, Token::int_value)
            .map(Matrix::from_rows)
            .transpose()?
            .map(Value::IntMatrix),
        ElementKind::Float => matrix_rows(rows, Token::float_value)
            .map(Matrix::from_rows)
            .transpose()?
            .map(Value::FloatMatrix),
        ElementKind::Bool => matrix_rows(rows, Token::bool_value)
            .map(Matrix::from_rows)
            .transpose()?
            .map(Value::BoolMatrix),
        ElementKind::Str => None,
    };
    match value {
        Some(value) => Ok(value),
        None => {
            let rows = rows.iter().map(|row| strings(row)).collect();
            Ok(Value::StrMatrix(Matrix::from_rows(rows)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_promotion() {
        let line = parse_comment_line("a=[1, 2] b=[1, 2.5] c=[T, F] d=[1, T] e=[1, \"2\"]").unwrap();
        assert_eq!(line.info.get("a"), Some(&Value::IntArray(vec![1, 2])));
        assert_eq!(line.info.get("b"), Some(&Value::FloatArray(vec![1.0, 2.5])));
        assert_eq!(line.info.get("c"), Some(&Value::BoolArray(vec![true, false])));
        assert_eq!(line.info.get("d"), Some(&Value::from(vec!["1", "T"])));
        assert_eq!(line.info.get("e"), Some(&Value::from(vec!["1", "2"])));
    }

    #[test]
    fn test_legacy_single_element_collapses() {
        let line = parse_comment_line("a=\"5\" b={x}").unwrap();
        assert_eq!(line.info.get("a"), Some(&Value::Int(5)));
        assert_eq!(line.info.get("b"), Some(&Value::from("x")));
    }

    #[test]
    fn test_legacy_nine_elements_column_major() {
        let line = parse_comment_line("m=\"1 2 3 4 5 6 7 8 9\"").unwrap();
        let expected = Matrix::from_rows(vec![vec![1, 4, 7], vec![2, 5, 8], vec![3, 6, 9]]).unwrap();
        assert_eq!(line.info.get("m"), Some(&Value::IntMatrix(expected)));
    }

    #[test]
    fn test_modern_nine_elements_stay_flat() {
        let line = parse_comment_line("m=[1, 2, 3, 4, 5, 6, 7, 8, 9]").unwrap();
        assert_eq!(line.info.get("m").map(Value::shape), Some(vec![9]));
    }

    #[test]
    fn test_ragged_matrix() {
        let err = parse_comment_line("m=[[1, 2], [3]]").unwrap_err();
        assert!(matches!(err, Error::Shape { .. }));
    }

    #[test]
    fn test_lattice_and_properties_removed_from_info() {
        let line = parse_comment_line("lattice=\"1 2 3\" properties=species:S:1 a=1").unwrap();
        assert_eq!(line.info.len(), 1);
        assert_eq!(line.lattice, Some(Lattice::diagonal(1.0, 2.0, 3.0)));
        assert_eq!(line.properties.map(|p| p.to_string()), Some("species:S:1".to_string()));
    }

    #[test]
    fn test_duplicate_lattice_any_case() {
        let err = parse_comment_line("Lattice=\"1 1 1\" LATTICE=\"2 2 2\"").unwrap_err();
        assert!(matches!(err, Error::DuplicateKey { .. }));
    }

    #[test]
    fn test_escaped_key() {
        let line = parse_comment_line(r#""my key"=1 a\=b=2"#).unwrap();
        assert_eq!(line.info.get("my key"), Some(&Value::Int(1)));
        assert_eq!(line.info.get("a=b"), Some(&Value::Int(2)));
    }
}
