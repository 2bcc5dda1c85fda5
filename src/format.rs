//! printf-style cell formats for data rows.
//!
//! Supports the subset of C format strings used for per-atom columns:
//! `%[flags][width][.precision]conv` with flags `-`, `+`, space and `0`, and
//! conversions `d i f F e E g G s`. Literal text around the conversion is
//! copied through and `%%` is a literal percent sign.
//!
//! ```rust
//! use extxyz::format::{CellFormat, FormatArg};
//!
//! let fmt = CellFormat::parse("%16.8f").unwrap();
//! assert_eq!(fmt.apply(&FormatArg::Float(1.5)).unwrap(), "      1.50000000");
//!
//! let fmt = CellFormat::parse("%.1s").unwrap();
//! assert_eq!(fmt.apply(&FormatArg::Str("True")).unwrap(), "T");
//! ```

use crate::{Error, Result};

/// A value passed to a [`CellFormat`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FormatArg<'a> {
    Int(i64),
    Float(f64),
    Str(&'a str),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Conversion {
    Int,
    Fixed { upper: bool },
    Exp { upper: bool },
    General { upper: bool },
    Str,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Flags {
    left: bool,
    plus: bool,
    space: bool,
    zero: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Spec {
    flags: Flags,
    width: usize,
    precision: Option<usize>,
    conversion: Conversion,
}

/// A parsed format string with exactly one conversion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellFormat {
    prefix: String,
    spec: Spec,
    suffix: String,
}

fn literal(text: &str) -> Result<String> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '%' {
            if chars.next() != Some('%') {
                return Err(Error::format(format!(
                    "format string must contain exactly one conversion, near {:?}",
                    text
                )));
            }
        }
        out.push(c);
    }
    Ok(out)
}

fn digits(s: &str) -> (usize, &str) {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    (s[..end].parse().unwrap_or(0), &s[end..])
}

impl CellFormat {
    /// Parses a format string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Format`] unless the string holds exactly one supported
    /// conversion.
    pub fn parse(fmt: &str) -> Result<Self> {
        let bad = || Error::format(format!("unsupported format string {:?}", fmt));

        let mut start = None;
        let mut i = 0;
        while let Some(off) = fmt[i..].find('%') {
            let at = i + off;
            if fmt[at + 1..].starts_with('%') {
                i = at + 2;
            } else {
                start = Some(at);
                break;
            }
        }
        let start = start.ok_or_else(bad)?;
        let prefix = literal(&fmt[..start])?;

        let mut rest = &fmt[start + 1..];
        let mut flags = Flags::default();
        while let Some(c) = rest.chars().next() {
            match c {
                '-' => flags.left = true,
                '+' => flags.plus = true,
                ' ' => flags.space = true,
                '0' => flags.zero = true,
                _ => break,
            }
            rest = &rest[1..];
        }
        let (width, after_width) = digits(rest);
        rest = after_width;
        let precision = if let Some(after_dot) = rest.strip_prefix('.') {
            let (p, after) = digits(after_dot);
            rest = after;
            Some(p)
        } else {
            None
        };

        let conv = rest.chars().next().ok_or_else(bad)?;
        let conversion = match conv {
            'd' | 'i' => Conversion::Int,
            'f' | 'F' => Conversion::Fixed { upper: conv == 'F' },
            'e' | 'E' => Conversion::Exp { upper: conv == 'E' },
            'g' | 'G' => Conversion::General { upper: conv == 'G' },
            's' => Conversion::Str,
            _ => return Err(bad()),
        };
        let suffix = literal(&rest[conv.len_utf8()..])?;

        Ok(CellFormat {
            prefix,
            spec: Spec {
                flags,
                width,
                precision,
                conversion,
            },
            suffix,
        })
    }

    /// Formats `arg`.
    ///
    /// Integer conversions truncate floats; float conversions widen integers;
    /// `%s` accepts anything and truncates to the precision if one is given.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Format`] if a string is given to a numeric conversion,
    /// or a non-finite float to `%d`.
    pub fn apply(&self, arg: &FormatArg<'_>) -> Result<String> {
        let spec = &self.spec;
        let body = match (spec.conversion, *arg) {
            (Conversion::Str, arg) => {
                let text = match arg {
                    FormatArg::Int(i) => i.to_string(),
                    FormatArg::Float(f) => format!("{:?}", f),
                    FormatArg::Str(s) => s.to_string(),
                };
                let text = match spec.precision {
                    Some(p) => text.chars().take(p).collect(),
                    None => text,
                };
                pad(text, spec.width, spec.flags.left)
            }
            (_, FormatArg::Str(s)) => {
                return Err(Error::format(format!(
                    "cannot apply a numeric format to string {:?}",
                    s
                )))
            }
            (Conversion::Int, FormatArg::Float(f)) if !f.is_finite() => {
                return Err(Error::format(format!("cannot format {} as an integer", f)))
            }
            (Conversion::Int, FormatArg::Float(f)) => {
                let t = f.trunc();
                self.numeric(t < 0.0, (t.abs() as u64).to_string(), true)
            }
            (Conversion::Int, FormatArg::Int(i)) => {
                self.numeric(i < 0, i.unsigned_abs().to_string(), true)
            }
            (_, FormatArg::Int(i)) => self.float(i as f64),
            (_, FormatArg::Float(f)) => self.float(f),
        };
        Ok(format!("{}{}{}", self.prefix, body, self.suffix))
    }

    fn float(&self, value: f64) -> String {
        let spec = &self.spec;
        let precision = spec.precision.unwrap_or(6);
        let magnitude = value.abs();
        let (body, upper) = if !value.is_finite() {
            let text = if value.is_nan() { "nan" } else { "inf" };
            (text.to_string(), conversion_upper(spec.conversion))
        } else {
            match spec.conversion {
                Conversion::Fixed { upper } => (format!("{:.*}", precision, magnitude), upper),
                Conversion::Exp { upper } => (c_exponent(magnitude, precision), upper),
                Conversion::General { upper } => (c_general(magnitude, precision), upper),
                Conversion::Int | Conversion::Str => (magnitude.to_string(), false),
            }
        };
        let body = if upper { body.to_uppercase() } else { body };
        let negative = value.is_sign_negative() && !value.is_nan();
        self.numeric(negative, body, value.is_finite())
    }

    /// Applies sign, zero padding and width to an unsigned numeric body.
    fn numeric(&self, negative: bool, body: String, zero_pad: bool) -> String {
        let flags = self.spec.flags;
        let sign = if negative {
            "-"
        } else if flags.plus {
            "+"
        } else if flags.space {
            " "
        } else {
            ""
        };
        let len = sign.len() + body.len();
        if zero_pad && flags.zero && !flags.left && len < self.spec.width {
            format!("{}{}{}", sign, "0".repeat(self.spec.width - len), body)
        } else {
            pad(format!("{}{}", sign, body), self.spec.width, flags.left)
        }
    }
}

fn conversion_upper(conversion: Conversion) -> bool {
    matches!(
        conversion,
        Conversion::Fixed { upper: true }
            | Conversion::Exp { upper: true }
            | Conversion::General { upper: true }
    )
}

fn pad(text: String, width: usize, left: bool) -> String {
    let len = text.chars().count();
    if len >= width {
        text
    } else if left {
        format!("{}{}", text, " ".repeat(width - len))
    } else {
        format!("{}{}", " ".repeat(width - len), text)
    }
}

/// Splits Rust's `{:e}` output into mantissa and exponent.
fn split_exponent(text: &str) -> (&str, i32) {
    match text.split_once('e') {
        Some((mantissa, exp)) => (mantissa, exp.parse().unwrap_or(0)),
        None => (text, 0),
    }
}

/// `%e` for a non-negative finite value: C always prints at least two exponent digits.
fn c_exponent(value: f64, precision: usize) -> String {
    let text = format!("{:.*e}", precision, value);
    let (mantissa, exp) = split_exponent(&text);
    let sign = if exp < 0 { '-' } else { '+' };
    format!("{}e{}{:02}", mantissa, sign, exp.abs())
}

/// `%g` for a non-negative finite value.
fn c_general(value: f64, precision: usize) -> String {
    let p = precision.max(1);
    let (_, exp) = split_exponent(&format!("{:.*e}", p - 1, value));
    if exp < -4 || exp >= p as i32 {
        let text = c_exponent(value, p - 1);
        match text.split_once('e') {
            Some((mantissa, exp)) => format!("{}e{}", trim_fraction(mantissa), exp),
            None => text,
        }
    } else {
        let decimals = (p as i32 - 1 - exp).max(0) as usize;
        trim_fraction(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn trim_fraction(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(spec: &str, arg: FormatArg<'_>) -> String {
        CellFormat::parse(spec).unwrap().apply(&arg).unwrap()
    }

    #[test]
    fn test_defaults() {
        assert_eq!(fmt("%16.8f", FormatArg::Float(-0.25)), "     -0.25000000");
        assert_eq!(fmt("%8d", FormatArg::Int(42)), "      42");
        assert_eq!(fmt("%s", FormatArg::Str("Si")), "Si");
        assert_eq!(fmt("%.1s", FormatArg::Str("False")), "F");
    }

    #[test]
    fn test_flags() {
        assert_eq!(fmt("%-6d|", FormatArg::Int(7)), "7     |");
        assert_eq!(fmt("%+d", FormatArg::Int(7)), "+7");
        assert_eq!(fmt("% d", FormatArg::Int(7)), " 7");
        assert_eq!(fmt("%05d", FormatArg::Int(-7)), "-0007");
        assert_eq!(fmt("%08.3f", FormatArg::Float(3.14159)), "0003.142");
    }

    #[test]
    fn test_exponent() {
        assert_eq!(fmt("%e", FormatArg::Float(1234.5)), "1.234500e+03");
        assert_eq!(fmt("%.2E", FormatArg::Float(-0.000123)), "-1.23E-04");
        assert_eq!(fmt("%.0e", FormatArg::Float(0.0)), "0e+00");
    }

    #[test]
    fn test_general() {
        assert_eq!(fmt("%g", FormatArg::Float(0.0001)), "0.0001");
        assert_eq!(fmt("%g", FormatArg::Float(0.00001)), "1e-05");
        assert_eq!(fmt("%g", FormatArg::Float(123456.0)), "123456");
        assert_eq!(fmt("%g", FormatArg::Float(1234567.0)), "1.23457e+06");
        assert_eq!(fmt("%.3g", FormatArg::Float(2.5)), "2.5");
    }

    #[test]
    fn test_literals() {
        assert_eq!(fmt("[%d]", FormatArg::Int(1)), "[1]");
        assert_eq!(fmt("%d%%", FormatArg::Int(50)), "50%");
    }

    #[test]
    fn test_int_from_float_truncates() {
        assert_eq!(fmt("%d", FormatArg::Float(-2.7)), "-2");
    }

    #[test]
    fn test_rejected() {
        assert!(CellFormat::parse("abc").is_err());
        assert!(CellFormat::parse("%d %d").is_err());
        assert!(CellFormat::parse("%q").is_err());
        let f = CellFormat::parse("%f").unwrap();
        assert!(f.apply(&FormatArg::Str("x")).is_err());
    }
}
