//! Character-class rules for comment-line tokens.
//!
//! Each scanner looks at the input starting at a byte offset and returns the
//! longest token of its class found there, or `None`. Scanners do not check
//! what follows the token; deciding whether a token ends at a valid boundary
//! is the grammar's job (see [`crate::de`]).
//!
//! ```rust
//! use extxyz::token::{self, TokenKind};
//!
//! let tok = token::float("x=-1.5d3", 2).unwrap();
//! assert_eq!(tok.kind, TokenKind::Float);
//! assert_eq!(tok.float_value(), Some(-1500.0));
//!
//! // only the leading "1" of "1.5" is an integer
//! assert_eq!(token::integer("1.5", 0).unwrap().text, "1");
//! ```

use std::ops::Range;

/// Regex for an integer data cell.
pub const INTEGER_RE: &str = r"[+-]?(?:0|[1-9][0-9]*)";
/// Regex for a float data cell; integers are valid floats.
pub const FLOAT_RE: &str =
    r"[+-]?(?:(?:0|[1-9][0-9]*)\.[0-9]*|\.[0-9]+|(?:0|[1-9][0-9]*))(?:[dDeE][+-]?[0-9]+)?";
/// Regex for a logical data cell.
pub const BOOL_RE: &str = r"(?:[tT]rue|[fF]alse|TRUE|FALSE|T|F)";
/// Regex for a string data cell.
pub const SIMPLESTRING_RE: &str = r"\S+";
/// Regex separating data cells.
pub const WHITESPACE_RE: &str = r"\s+";

const BOOL_LITERALS: [(&str, bool); 8] = [
    ("true", true),
    ("True", true),
    ("TRUE", true),
    ("false", false),
    ("False", false),
    ("FALSE", false),
    ("T", true),
    ("F", false),
];

/// The three interchangeable quoting styles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Delimiter {
    /// `"..."`
    DoubleQuote,
    /// `{...}`
    Brace,
    /// `[...]`
    Bracket,
}

impl Delimiter {
    #[must_use]
    pub const fn open(self) -> char {
        match self {
            Delimiter::DoubleQuote => '"',
            Delimiter::Brace => '{',
            Delimiter::Bracket => '[',
        }
    }

    #[must_use]
    pub const fn close(self) -> char {
        match self {
            Delimiter::DoubleQuote => '"',
            Delimiter::Brace => '}',
            Delimiter::Bracket => ']',
        }
    }

    #[must_use]
    pub const fn from_open(c: char) -> Option<Self> {
        match c {
            '"' => Some(Delimiter::DoubleQuote),
            '{' => Some(Delimiter::Brace),
            '[' => Some(Delimiter::Bracket),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Integer,
    Float,
    Bool,
    BareString,
    QuotedString(Delimiter),
}

impl TokenKind {
    /// Category name used in syntax error messages.
    #[must_use]
    pub const fn category(self) -> &'static str {
        match self {
            TokenKind::Integer => "integer",
            TokenKind::Float => "float",
            TokenKind::Bool => "bool",
            TokenKind::BareString => "bare string",
            TokenKind::QuotedString(Delimiter::DoubleQuote) => "double-quoted string",
            TokenKind::QuotedString(Delimiter::Brace) => "brace-quoted string",
            TokenKind::QuotedString(Delimiter::Bracket) => "bracket-quoted string",
        }
    }

    #[must_use]
    pub const fn is_string(self) -> bool {
        matches!(self, TokenKind::BareString | TokenKind::QuotedString(_))
    }
}

/// A matched token and the text it covers.
#[derive(Clone, Debug, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub span: Range<usize>,
    pub text: &'a str,
}

impl<'a> Token<'a> {
    fn new(input: &'a str, kind: TokenKind, span: Range<usize>) -> Self {
        Token {
            kind,
            text: &input[span.clone()],
            span,
        }
    }

    #[must_use]
    pub fn int_value(&self) -> Option<i64> {
        match self.kind {
            TokenKind::Integer => self.text.parse().ok(),
            _ => None,
        }
    }

    /// Float value of a float or integer token, with `d`/`D` exponents normalized.
    #[must_use]
    pub fn float_value(&self) -> Option<f64> {
        match self.kind {
            TokenKind::Float | TokenKind::Integer => {
                self.text.replace(['d', 'D'], "e").parse().ok()
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn bool_value(&self) -> Option<bool> {
        match self.kind {
            TokenKind::Bool => BOOL_LITERALS
                .iter()
                .find(|(lit, _)| *lit == self.text)
                .map(|(_, b)| *b),
            _ => None,
        }
    }

    /// String form of the token: quotes stripped and escapes resolved for
    /// strings, the literal text otherwise.
    #[must_use]
    pub fn string_value(&self) -> String {
        match self.kind {
            TokenKind::QuotedString(_) => unescape_quoted(&self.text[1..self.text.len() - 1]),
            TokenKind::BareString => unescape_bare(self.text),
            _ => self.text.to_string(),
        }
    }
}

/// Characters that end a bare string unless backslash-escaped.
#[inline]
#[must_use]
pub fn is_reserved(c: char) -> bool {
    matches!(c, '=' | '"' | ',' | '[' | ']' | '{' | '}' | '\\') || c.is_whitespace()
}

fn scan_digits(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    i
}

fn scan_sign(bytes: &[u8], i: usize) -> usize {
    match bytes.get(i) {
        Some(b'+') | Some(b'-') => i + 1,
        _ => i,
    }
}

/// `0|[1-9][0-9]*`
fn scan_bare_int(bytes: &[u8], i: usize) -> Option<usize> {
    match bytes.get(i) {
        Some(b'0') => Some(i + 1),
        Some(b'1'..=b'9') => Some(scan_digits(bytes, i + 1)),
        _ => None,
    }
}

/// Scans `[+-]?(0|[1-9][0-9]*)`. Values outside the `i64` range are not integers.
#[must_use]
pub fn integer(input: &str, pos: usize) -> Option<Token<'_>> {
    let bytes = input.as_bytes();
    let end = scan_bare_int(bytes, scan_sign(bytes, pos))?;
    let token = Token::new(input, TokenKind::Integer, pos..end);
    token.int_value().map(|_| token)
}

/// Scans a float: decimal or integer mantissa with an optional exponent.
#[must_use]
pub fn float(input: &str, pos: usize) -> Option<Token<'_>> {
    let bytes = input.as_bytes();
    let start = scan_sign(bytes, pos);
    let mut end = if let Some(j) = scan_bare_int(bytes, start) {
        if bytes.get(j) == Some(&b'.') {
            scan_digits(bytes, j + 1)
        } else {
            j
        }
    } else if bytes.get(start) == Some(&b'.') && bytes.get(start + 1).is_some_and(u8::is_ascii_digit)
    {
        scan_digits(bytes, start + 1)
    } else {
        return None;
    };

    if matches!(bytes.get(end), Some(b'd' | b'D' | b'e' | b'E')) {
        let exp_start = scan_sign(bytes, end + 1);
        let exp_end = scan_digits(bytes, exp_start);
        if exp_end > exp_start {
            end = exp_end;
        }
    }
    Some(Token::new(input, TokenKind::Float, pos..end))
}

/// Scans `true|True|TRUE|false|False|FALSE|T|F`, longest literal first.
#[must_use]
pub fn boolean(input: &str, pos: usize) -> Option<Token<'_>> {
    let rest = &input[pos..];
    BOOL_LITERALS
        .iter()
        .find(|(lit, _)| rest.starts_with(lit))
        .map(|(lit, _)| Token::new(input, TokenKind::Bool, pos..pos + lit.len()))
}

/// Scans a run of non-reserved characters; `\X` is consumed as a pair for any `X`.
#[must_use]
pub fn bare_string(input: &str, pos: usize) -> Option<Token<'_>> {
    let mut chars = input[pos..].char_indices().peekable();
    let mut end = pos;
    while let Some((offset, c)) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some((next_offset, next)) => end = pos + next_offset + next.len_utf8(),
                None => break,
            }
        } else if is_reserved(c) {
            break;
        } else {
            end = pos + offset + c.len_utf8();
        }
    }
    (end > pos).then(|| Token::new(input, TokenKind::BareString, pos..end))
}

/// Scans a string quoted with `delimiter`, starting at its opening character.
///
/// Only the style's own delimiter is significant inside the payload; an
/// unescaped opening brace or bracket inside its own style fails the match.
#[must_use]
pub fn quoted_string_with(input: &str, pos: usize, delimiter: Delimiter) -> Option<Token<'_>> {
    let mut chars = input[pos..].char_indices();
    match chars.next() {
        Some((_, c)) if c == delimiter.open() => {}
        _ => return None,
    }
    while let Some((offset, c)) = chars.next() {
        if c == '\\' {
            chars.next()?;
        } else if c == delimiter.close() {
            let end = pos + offset + c.len_utf8();
            return Some(Token::new(
                input,
                TokenKind::QuotedString(delimiter),
                pos..end,
            ));
        } else if c == delimiter.open() {
            return None;
        }
    }
    None
}

/// Scans a quoted string in whichever style starts at `pos`.
#[must_use]
pub fn quoted_string(input: &str, pos: usize) -> Option<Token<'_>> {
    let delimiter = input[pos..].chars().next().and_then(Delimiter::from_open)?;
    quoted_string_with(input, pos, delimiter)
}

/// Scans a bare or quoted string.
#[must_use]
pub fn string(input: &str, pos: usize) -> Option<Token<'_>> {
    bare_string(input, pos).or_else(|| quoted_string(input, pos))
}

/// Resolves escapes in a quoted payload: `\n` is a newline, any other `\X` is `X`.
#[must_use]
pub fn unescape_quoted(payload: &str) -> String {
    let mut out = String::with_capacity(payload.len());
    let mut chars = payload.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some(other) => out.push(other),
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Resolves escapes in a bare string: `\X` is literally `X`.
#[must_use]
pub fn unescape_bare(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(other) = chars.next() {
                out.push(other);
            }
        } else {
            out.push(c);
        }
    }
    out
}
