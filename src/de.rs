//! Comment-line grammar.
//!
//! This module provides the [`Parser`] that splits a comment line into
//! `key=value` pairs. Values are resolved by ordered, first-match choice:
//!
//! 1. `Properties` (any case) forces the `name:type:columns` sub-grammar
//! 2. nested 2-D array `[[..], [..]]`
//! 3. legacy 1-D array `"1 2 3"` or `{a b c}`
//! 4. modern 1-D array `[1, 2, 3]`
//! 5. integer, float, bool
//! 6. string (bare or quoted)
//!
//! An alternative is only taken if it ends at a separator (whitespace or end
//! of line); otherwise the next one is tried. The amount of text matched never
//! decides between alternatives, so `{1 2 3}` is an integer array rather than
//! the brace-quoted string `1 2 3`, and `3` is an integer rather than a bare
//! string.
//!
//! ## Usage
//!
//! Most users should use [`crate::parse_comment_line`], which also converts
//! the parse result into typed values:
//!
//! ```rust
//! use extxyz::de::{Node, Parser};
//!
//! let pairs = Parser::new("a={1 2 3} b=3").parse().unwrap();
//! assert!(matches!(pairs[0].value, Node::LegacyArray(_)));
//! assert!(matches!(pairs[1].value, Node::Scalar(_)));
//! ```

use crate::extract::{promote, ElementKind};
use crate::token::{self, Delimiter, Token};
use crate::{Error, PropertiesSchema, Result};
use std::collections::BTreeSet;
use std::ops::Range;

/// A parsed value, before conversion to [`crate::Value`].
#[derive(Clone, Debug, PartialEq)]
pub enum Node<'a> {
    Scalar(Token<'a>),
    LegacyArray(Vec<Token<'a>>),
    Array(Vec<Token<'a>>),
    NestedArray(Vec<Vec<Token<'a>>>),
    Properties(PropertiesSchema),
}

/// One `key=value` pair and the span of input it covers.
#[derive(Clone, Debug, PartialEq)]
pub struct Pair<'a> {
    pub key: Token<'a>,
    pub value: Node<'a>,
    pub span: Range<usize>,
}

type Alternative<'a> = fn(&mut Parser<'a>, usize) -> Option<(Node<'a>, usize)>;
type Scanner<'a> = fn(&'a str, usize) -> Option<Token<'a>>;

fn scalar(tok: Option<Token<'_>>) -> Option<(Node<'_>, usize)> {
    tok.map(|t| {
        let end = t.span.end;
        (Node::Scalar(t), end)
    })
}

/// Recursive-descent parser for a single comment line.
///
/// Tracks the furthest position any alternative reached and what it expected
/// there, for error reporting.
pub struct Parser<'a> {
    input: &'a str,
    furthest: usize,
    expected: BTreeSet<&'static str>,
}

impl<'a> Parser<'a> {
    /// Creates a parser; a trailing `\n` or `\r\n` is ignored.
    pub fn new(input: &'a str) -> Self {
        Parser {
            input: input.trim_end_matches(['\n', '\r']),
            furthest: 0,
            expected: BTreeSet::new(),
        }
    }

    /// Parses the whole line.
    ///
    /// # Errors
    ///
    /// - [`Error::Syntax`] if the line is not entirely made of `key=value` pairs
    /// - [`Error::Schema`] if a `Properties` value is malformed
    pub fn parse(mut self) -> Result<Vec<Pair<'a>>> {
        let mut pairs = Vec::new();
        let mut pos = self.skip_whitespace(0);
        let mut parsed = 0;

        while pos < self.input.len() {
            match self.pair(pos)? {
                Some((pair, end)) => {
                    log::trace!("parsed pair {:?} at {:?}", pair.key.text, pair.span);
                    pairs.push(pair);
                    pos = self.skip_whitespace(end);
                    parsed = pos;
                }
                None => return Err(self.syntax_error(parsed)),
            }
        }
        Ok(pairs)
    }

    fn syntax_error(&self, parsed: usize) -> Error {
        Error::syntax(
            parsed,
            self.furthest,
            self.expected.iter().map(|s| s.to_string()).collect(),
            &self.input[..parsed],
        )
    }

    fn expect(&mut self, pos: usize, what: &'static str) {
        if pos > self.furthest {
            self.furthest = pos;
            self.expected.clear();
        }
        if pos == self.furthest {
            self.expected.insert(what);
        }
    }

    fn peek_char(&self, pos: usize) -> Option<char> {
        self.input.get(pos..).and_then(|rest| rest.chars().next())
    }

    fn skip_whitespace(&self, mut pos: usize) -> usize {
        while let Some(ch) = self.peek_char(pos) {
            if ch.is_whitespace() {
                pos += ch.len_utf8();
            } else {
                break;
            }
        }
        pos
    }

    fn at_value_end(&self, pos: usize) -> bool {
        self.peek_char(pos).map_or(true, char::is_whitespace)
    }

    fn pair(&mut self, start: usize) -> Result<Option<(Pair<'a>, usize)>> {
        let Some(key) = token::string(self.input, start) else {
            self.expect(start, "key");
            return Ok(None);
        };

        let mut pos = self.skip_whitespace(key.span.end);
        if self.peek_char(pos) != Some('=') {
            self.expect(pos, "=");
            return Ok(None);
        }
        pos = self.skip_whitespace(pos + 1);

        let value = if key
            .string_value()
            .eq_ignore_ascii_case(PropertiesSchema::KEY)
        {
            Some(self.properties(pos)?)
        } else {
            self.value(pos)
        };

        Ok(value.map(|(value, end)| {
            let pair = Pair {
                key,
                value,
                span: start..end,
            };
            (pair, end)
        }))
    }

    /// `name:T:n(:name:T:n)*`, run up to the next separator, or a double-quoted payload.
    fn properties(&mut self, pos: usize) -> Result<(Node<'a>, usize)> {
        let (text, end) = match token::quoted_string_with(self.input, pos, Delimiter::DoubleQuote) {
            Some(tok) if self.at_value_end(tok.span.end) => (tok.string_value(), tok.span.end),
            _ => {
                let rest = &self.input[pos..];
                let len = rest.find(char::is_whitespace).unwrap_or(rest.len());
                (rest[..len].to_string(), pos + len)
            }
        };
        let schema = text
            .parse::<PropertiesSchema>()
            .map_err(|e| Error::schema(format!("malformed Properties value {:?}: {}", text, e)))?;
        Ok((Node::Properties(schema), end))
    }

    fn value(&mut self, pos: usize) -> Option<(Node<'a>, usize)> {
        let alternatives: [(Alternative<'a>, &'static str); 7] = [
            (Self::nested_array, "2-D array"),
            (Self::legacy_array, "legacy array"),
            (Self::modern_array, "array"),
            (Self::integer, "integer"),
            (Self::float, "float"),
            (Self::boolean, "bool"),
            (Self::string, "string"),
        ];

        for (alternative, category) in alternatives {
            match alternative(self, pos) {
                Some((node, end)) if self.at_value_end(end) => return Some((node, end)),
                Some((_, end)) => self.expect(end, "whitespace"),
                None => self.expect(pos, category),
            }
        }
        None
    }

    fn integer(&mut self, pos: usize) -> Option<(Node<'a>, usize)> {
        scalar(token::integer(self.input, pos))
    }

    fn float(&mut self, pos: usize) -> Option<(Node<'a>, usize)> {
        scalar(token::float(self.input, pos))
    }

    fn boolean(&mut self, pos: usize) -> Option<(Node<'a>, usize)> {
        scalar(token::boolean(self.input, pos))
    }

    fn string(&mut self, pos: usize) -> Option<(Node<'a>, usize)> {
        scalar(token::string(self.input, pos))
    }

    /// `[` row (`,` | whitespace) row ... `]`, where each row is a modern 1-D array.
    fn nested_array(&mut self, pos: usize) -> Option<(Node<'a>, usize)> {
        if self.peek_char(pos) != Some('[') {
            return None;
        }
        let mut i = self.skip_whitespace(pos + 1);
        let mut rows = Vec::new();
        loop {
            let Some((row, end)) = self.array_elements(i) else {
                self.expect(i, "[");
                return None;
            };
            rows.push(row);
            let j = self.skip_whitespace(end);
            match self.peek_char(j) {
                Some(']') => return Some((Node::NestedArray(rows), j + 1)),
                Some(',') => i = self.skip_whitespace(j + 1),
                Some('[') if j > end => i = j,
                _ => {
                    self.expect(j, ",");
                    self.expect(j, "]");
                    return None;
                }
            }
        }
    }

    fn modern_array(&mut self, pos: usize) -> Option<(Node<'a>, usize)> {
        self.array_elements(pos)
            .map(|(elements, end)| (Node::Array(elements), end))
    }

    /// `[` element (`,` element)* `]` with optional whitespace around items.
    fn array_elements(&mut self, pos: usize) -> Option<(Vec<Token<'a>>, usize)> {
        if self.peek_char(pos) != Some('[') {
            return None;
        }
        let mut i = self.skip_whitespace(pos + 1);
        let mut elements = Vec::new();
        loop {
            let element = self.element(i, |parser, end| {
                let j = parser.skip_whitespace(end);
                matches!(parser.peek_char(j), Some(',') | Some(']'))
            })?;
            let j = self.skip_whitespace(element.span.end);
            elements.push(element);
            match self.peek_char(j) {
                Some(',') => i = self.skip_whitespace(j + 1),
                Some(']') => return Some((elements, j + 1)),
                _ => {
                    self.expect(j, ",");
                    self.expect(j, "]");
                    return None;
                }
            }
        }
    }

    /// Whitespace-separated elements inside `"..."` (numbers and bools) or
    /// `{...}` (also strings); the run must promote to a single type.
    fn legacy_array(&mut self, pos: usize) -> Option<(Node<'a>, usize)> {
        let delimiter = match self.peek_char(pos) {
            Some('"') => Delimiter::DoubleQuote,
            Some('{') => Delimiter::Brace,
            _ => return None,
        };
        let close = delimiter.close();
        let allow_strings = delimiter == Delimiter::Brace;

        let mut i = self.skip_whitespace(pos + 1);
        let mut elements = Vec::new();
        loop {
            if !elements.is_empty() && self.peek_char(i) == Some(close) {
                break;
            }
            let element = if allow_strings {
                self.element(i, |parser, end| {
                    parser
                        .peek_char(end)
                        .map_or(false, |c| c.is_whitespace() || c == '}')
                })
            } else {
                self.number_or_bool(i, |parser, end| {
                    parser
                        .peek_char(end)
                        .map_or(false, |c| c.is_whitespace() || c == '"')
                })
            }?;
            i = self.skip_whitespace(element.span.end);
            elements.push(element);
        }

        if !allow_strings && promote(&elements) == ElementKind::Str {
            self.expect(pos, "homogeneous legacy array");
            return None;
        }
        Some((Node::LegacyArray(elements), i + close.len_utf8()))
    }

    fn number_or_bool(
        &mut self,
        pos: usize,
        ends: fn(&Parser<'a>, usize) -> bool,
    ) -> Option<Token<'a>> {
        let scanners: [Scanner<'a>; 3] = [
            token::integer as Scanner<'a>,
            token::float as Scanner<'a>,
            token::boolean as Scanner<'a>,
        ];
        self.first_match(pos, ends, &scanners)
    }

    fn element(&mut self, pos: usize, ends: fn(&Parser<'a>, usize) -> bool) -> Option<Token<'a>> {
        let scanners: [Scanner<'a>; 4] = [
            token::integer as Scanner<'a>,
            token::float as Scanner<'a>,
            token::boolean as Scanner<'a>,
            token::string as Scanner<'a>,
        ];
        self.first_match(pos, ends, &scanners)
    }

    fn first_match(
        &mut self,
        pos: usize,
        ends: fn(&Parser<'a>, usize) -> bool,
        scanners: &[Scanner<'a>],
    ) -> Option<Token<'a>> {
        for scan in scanners {
            if let Some(tok) = scan(self.input, pos) {
                if ends(self, tok.span.end) {
                    return Some(tok);
                }
                self.expect(tok.span.end, "separator");
            }
        }
        self.expect(pos, "array element");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;

    fn single(line: &str) -> Node<'_> {
        let mut pairs = Parser::new(line).parse().unwrap();
        assert_eq!(pairs.len(), 1);
        pairs.remove(0).value
    }

    #[test]
    fn test_first_match_not_longest() {
        match single("a={1 2 3}") {
            Node::LegacyArray(tokens) => assert_eq!(tokens.len(), 3),
            other => panic!("expected legacy array, got {:?}", other),
        }
        match single("a=3") {
            Node::Scalar(tok) => assert_eq!(tok.kind, TokenKind::Integer),
            other => panic!("expected integer, got {:?}", other),
        }
    }

    #[test]
    fn test_element_scanners_in_order() {
        let kinds = |tokens: &[Token<'_>]| tokens.iter().map(|t| t.kind).collect::<Vec<_>>();
        match single("a=[1, 2.5, T, x]") {
            Node::Array(tokens) => assert_eq!(
                kinds(&tokens),
                vec![
                    TokenKind::Integer,
                    TokenKind::Float,
                    TokenKind::Bool,
                    TokenKind::BareString
                ]
            ),
            other => panic!("expected array, got {:?}", other),
        }
        match single("a=\"1 2.5 3\"") {
            Node::LegacyArray(tokens) => {
                assert_eq!(
                    kinds(&tokens),
                    vec![TokenKind::Integer, TokenKind::Float, TokenKind::Integer]
                )
            }
            other => panic!("expected legacy array, got {:?}", other),
        }
    }

    #[test]
    fn test_integer_abandoned_for_float() {
        match single("a=1.5") {
            Node::Scalar(tok) => assert_eq!(tok.kind, TokenKind::Float),
            other => panic!("expected float, got {:?}", other),
        }
    }

    #[test]
    fn test_bool_abandoned_for_string() {
        match single("a=Tfoo") {
            Node::Scalar(tok) => assert_eq!(tok.kind, TokenKind::BareString),
            other => panic!("expected bare string, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_array_separators() {
        for line in ["a=[[1, 2], [3, 4]]", "a=[ [1,2] [3,4] ]"] {
            match single(line) {
                Node::NestedArray(rows) => assert_eq!(rows.len(), 2),
                other => panic!("expected nested array for {}, got {:?}", line, other),
            }
        }
    }

    #[test]
    fn test_space_separated_brackets_are_quoted_string() {
        match single("a=[1 2]") {
            Node::Scalar(tok) => {
                assert_eq!(tok.kind, TokenKind::QuotedString(Delimiter::Bracket))
            }
            other => panic!("expected bracket string, got {:?}", other),
        }
    }

    #[test]
    fn test_mixed_double_quoted_is_string() {
        match single("a=\"1 T\"") {
            Node::Scalar(tok) => {
                assert_eq!(tok.kind, TokenKind::QuotedString(Delimiter::DoubleQuote))
            }
            other => panic!("expected quoted string, got {:?}", other),
        }
    }

    #[test]
    fn test_whitespace_around_equals() {
        let pairs = Parser::new("bob = 2 joe= 3 sam =4").parse().unwrap();
        assert_eq!(pairs.len(), 3);
    }

    #[test]
    fn test_properties_forced() {
        match single("properties=species:S:1:pos:R:3") {
            Node::Properties(schema) => assert_eq!(schema.len(), 2),
            other => panic!("expected properties, got {:?}", other),
        }
        assert!(matches!(
            Parser::new("Properties=species:S").parse(),
            Err(Error::Schema { .. })
        ));
    }

    #[test]
    fn test_missing_equals() {
        let err = Parser::new("i 5").parse().unwrap_err();
        match err {
            Error::Syntax {
                position,
                furthest,
                expected,
                ..
            } => {
                assert_eq!(position, 0);
                assert_eq!(furthest, 2);
                assert!(expected.contains(&"=".to_string()));
            }
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_trailing_garbage_reports_prefix() {
        let err = Parser::new("a=1 b=abc\"def").parse().unwrap_err();
        match err {
            Error::Syntax {
                position, parsed, ..
            } => {
                assert_eq!(position, 4);
                assert_eq!(parsed, "a=1 ");
            }
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_line() {
        assert!(Parser::new("").parse().unwrap().is_empty());
        assert!(Parser::new("   \n").parse().unwrap().is_empty());
    }
}
