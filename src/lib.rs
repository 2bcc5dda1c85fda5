//! # extxyz
//!
//! A parser and writer for the extended XYZ format, the text format used to
//! store atomic configurations together with arbitrary per-frame and per-atom
//! metadata.
//!
//! ## What is extended XYZ?
//!
//! Each frame is a line with the number of atoms, a *comment line* of
//! `key=value` pairs, and one data row per atom. The comment line's
//! `Properties` entry declares the columns of the data rows:
//!
//! ```text
//! 2
//! Lattice="5.0 0 0 0 5.0 0 0 0 5.0" Properties=species:S:1:pos:R:3 energy=-2.5 pbc="T T T"
//! H 0.00000000 0.00000000 0.00000000
//! H 0.00000000 0.00000000 0.74000000
//! ```
//!
//! ## Key Features
//!
//! - **Deterministic grammar**: values are resolved by ordered first match,
//!   so the same line always parses the same way
//! - **Typed values**: scalars, 1-D arrays and 2-D matrices of int, float,
//!   bool and string, with array type promotion
//! - **Compiled schemas**: a `Properties` value compiles once into a row
//!   regex and column layout, shared between frames behind an `Arc`
//! - **Round trip**: the writer output reads back to the same values
//! - **Serde output**: values, documents and tables implement `Serialize`
//!
//! ## Quick Start
//!
//! ### Parsing a comment line
//!
//! ```rust
//! use extxyz::{parse_comment_line, Value};
//!
//! let line = parse_comment_line(
//!     r#"Properties=species:S:1:pos:R:3 energy=-2.5 pbc="T T F" tags={a b c}"#,
//! )
//! .unwrap();
//!
//! assert_eq!(line.info.get("energy"), Some(&Value::Float(-2.5)));
//! assert_eq!(line.info.get("pbc"), Some(&Value::from(vec![true, true, false])));
//! assert_eq!(line.info.get("tags"), Some(&Value::from(vec!["a", "b", "c"])));
//! assert_eq!(line.properties.unwrap().n_columns(), 4);
//! ```
//!
//! ### Reading frames
//!
//! ```rust
//! use extxyz::{FrameReader, Value};
//!
//! let text = "1\nProperties=species:S:1:pos:R:3:Z:I:1\nO 0.0 0.0 0.0 8\n";
//! let frame = FrameReader::new(text.as_bytes()).next_frame().unwrap().unwrap();
//!
//! assert_eq!(frame.table.get("Z"), Some(&Value::IntArray(vec![8])));
//! ```
//!
//! ### Writing
//!
//! ```rust
//! use extxyz::{document, write_comment_line, CommentLine, Lattice};
//!
//! let line = CommentLine::new(document! { "energy" => -2.5, "label" => "two words" })
//!     .with_lattice(Lattice::diagonal(5.0, 5.0, 5.0));
//! let text = write_comment_line(&line).unwrap();
//!
//! assert!(text.starts_with(r#"energy=-2.5 label="two words" Lattice=[[5.0, 0.0, 0.0]"#));
//! assert_eq!(extxyz::parse_comment_line(&text).unwrap(), line);
//! ```
//!
//! ## Error Handling
//!
//! Every operation returns [`Result`]. Errors are typed by cause (syntax,
//! duplicate key, shape, schema, column count, format) and never come with a
//! partial result. See [`Error`].
//!
//! ## Format Reference
//!
//! The grammar, promotion rules and writer conventions are described in
//! [`grammar`].

pub mod de;
pub mod error;
pub mod extract;
pub mod format;
pub mod frame;
pub mod grammar;
pub mod macros;
pub mod map;
pub mod options;
pub mod properties;
pub mod ser;
pub mod token;
pub mod value;

pub use error::{Error, Result};
pub use extract::{parse_comment_line, CommentLine};
pub use frame::{parse_frame, write_frame, write_frame_to, Frame, FrameReader, Timings};
pub use map::Document;
pub use options::{FormatDict, WriteOptions};
pub use properties::{CompiledSchema, PropertiesSchema, PropertySpec, PropertyType, Table};
pub use ser::{
    write_comment_line, write_comment_line_with_options, write_document, write_rows, write_value,
    Serializer,
};
pub use value::{Lattice, Matrix, Value};

use std::io;

/// Reads frames lazily from any reader.
///
/// # Examples
///
/// ```rust
/// use std::io::Cursor;
///
/// let data = Cursor::new("1\n\nAr 0 0 0\n1\n\nAr 0 0 3.4\n");
/// let frames = extxyz::read_frames(data).collect::<extxyz::Result<Vec<_>>>().unwrap();
/// assert_eq!(frames.len(), 2);
/// ```
pub fn read_frames<R: io::Read>(reader: R) -> FrameReader<io::BufReader<R>> {
    FrameReader::new(io::BufReader::new(reader))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_line_roundtrip() {
        let text = r#"a=1 b=2.5 c=T d="hello world" e=[1, 2, 3] f=[[1.0, 2.0], [3.0, 4.0]]"#;
        let line = parse_comment_line(text).unwrap();
        let written = write_comment_line(&line).unwrap();
        assert_eq!(written, text);
        assert_eq!(parse_comment_line(&written).unwrap(), line);
    }

    #[test]
    fn test_frame_roundtrip() {
        let text = "2\nProperties=species:S:1:pos:R:3 energy=-1.0\nH 0.0 0.0 0.0\nH 0.0 0.0 0.75\n";
        let frame = parse_frame(text).unwrap();
        let written = write_frame(&frame, &WriteOptions::default()).unwrap();
        let again = parse_frame(&written).unwrap();
        assert_eq!(again.info, frame.info);
        assert_eq!(again.table, frame.table);
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::from(vec![true, false]).to_string(), "[T, F]");
    }
}
