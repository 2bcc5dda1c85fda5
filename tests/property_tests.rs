//! Property-based tests for extxyz
//!
//! Written comment lines and data rows must read back to the values they
//! were written from.

use extxyz::{
    parse_comment_line, parse_frame, write_document, write_frame, write_value, Document,
    FormatDict, Frame, Matrix, Table, Value, WriteOptions,
};
use proptest::prelude::*;

fn roundtrip(value: &Value) -> bool {
    let text = match write_value(value) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("write failed for {:?}: {}", value, e);
            return false;
        }
    };
    let line = format!("k={}", text);
    match parse_comment_line(&line) {
        Ok(parsed) if parsed.info.get("k") == Some(value) => true,
        Ok(parsed) => {
            eprintln!("mismatch: {:?} wrote {:?}, read {:?}", value, line, parsed.info.get("k"));
            false
        }
        Err(e) => {
            eprintln!("parse failed for {:?}: {}", line, e);
            false
        }
    }
}

fn finite() -> impl Strategy<Value = f64> {
    any::<f64>().prop_filter("finite", |f| f.is_finite())
}

fn text() -> impl Strategy<Value = String> {
    "\\PC*"
}

fn matrix<S: Strategy>(element: fn() -> S) -> impl Strategy<Value = Matrix<S::Value>> {
    (1..4usize, 1..4usize).prop_flat_map(move |(rows, cols)| {
        prop::collection::vec(element(), rows * cols)
            .prop_map(move |data| Matrix::from_row_major(rows, cols, data).unwrap())
    })
}

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::Int),
        finite().prop_map(Value::Float),
        any::<bool>().prop_map(Value::Bool),
        text().prop_map(Value::Str),
    ]
}

fn array() -> impl Strategy<Value = Value> {
    prop_oneof![
        prop::collection::vec(any::<i64>(), 1..8).prop_map(Value::IntArray),
        prop::collection::vec(finite(), 1..8).prop_map(Value::FloatArray),
        prop::collection::vec(any::<bool>(), 1..8).prop_map(Value::BoolArray),
        prop::collection::vec(text(), 1..8).prop_map(Value::StrArray),
    ]
}

fn matrix_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        matrix(any::<i64>).prop_map(Value::IntMatrix),
        matrix(finite).prop_map(Value::FloatMatrix),
        matrix(any::<bool>).prop_map(Value::BoolMatrix),
        matrix(text).prop_map(Value::StrMatrix),
    ]
}

fn value() -> impl Strategy<Value = Value> {
    prop_oneof![scalar(), array(), matrix_value()]
}

fn key() -> impl Strategy<Value = String> {
    text().prop_filter("reserved key", |k| {
        !k.eq_ignore_ascii_case("properties") && !k.eq_ignore_ascii_case("lattice")
    })
}

proptest! {
    #[test]
    fn prop_int_roundtrip(i in any::<i64>()) {
        prop_assert!(roundtrip(&Value::Int(i)));
    }

    #[test]
    fn prop_float_roundtrip(f in finite()) {
        prop_assert!(roundtrip(&Value::Float(f)));
    }

    #[test]
    fn prop_string_roundtrip(s in text()) {
        prop_assert!(roundtrip(&Value::Str(s)));
    }

    #[test]
    fn prop_numeric_looking_string_roundtrip(parts in prop::collection::vec("[+-]?[0-9]{1,3}(\\.[0-9]*)?|T|F|true", 1..5)) {
        prop_assert!(roundtrip(&Value::Str(parts.join(" "))));
    }

    #[test]
    fn prop_value_roundtrip(v in value()) {
        prop_assert!(roundtrip(&v));
    }

    #[test]
    fn prop_document_roundtrip(pairs in prop::collection::vec((key(), value()), 0..6)) {
        let doc: Document = pairs.into_iter().collect();
        let text = write_document(&doc).unwrap();
        let back = parse_comment_line(&text).unwrap();
        prop_assert_eq!(back.info, doc);
        prop_assert!(back.lattice.is_none());
        prop_assert!(back.properties.is_none());
    }

    #[test]
    fn prop_rows_roundtrip(
        atoms in prop::collection::vec(
            ("[A-Z][a-z]?", finite(), finite(), finite(), any::<i64>(), any::<bool>()),
            1..10,
        )
    ) {
        let n = atoms.len();
        let mut species = Vec::with_capacity(n);
        let mut pos = Vec::with_capacity(n * 3);
        let mut tags = Vec::with_capacity(n);
        let mut fixed = Vec::with_capacity(n);
        for (s, x, y, z, t, f) in atoms {
            species.push(s);
            pos.extend([x, y, z]);
            tags.push(t);
            fixed.push(f);
        }
        let table = Table::from_columns(vec![
            ("species".to_string(), Value::StrArray(species)),
            ("pos".to_string(), Value::FloatMatrix(Matrix::from_row_major(n, 3, pos).unwrap())),
            ("tags".to_string(), Value::IntArray(tags)),
            ("fixed".to_string(), Value::BoolArray(fixed)),
        ])
        .unwrap();
        let frame = Frame::new(Document::new(), None, table).unwrap();

        let options = WriteOptions::new().with_formats(FormatDict::new().with_real("%.17g"));
        let text = write_frame(&frame, &options).unwrap();
        let back = parse_frame(&text).unwrap();
        prop_assert_eq!(back.table, frame.table);
    }
}
