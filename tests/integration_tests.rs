use extxyz::{parse_comment_line, write_comment_line, Error, Lattice, Matrix, Value};

fn value(line: &str, key: &str) -> Value {
    let parsed = parse_comment_line(line).unwrap();
    parsed
        .info
        .get(key)
        .cloned()
        .unwrap_or_else(|| panic!("{} missing from {:?}", key, line))
}

#[test]
fn test_scalars() {
    let line = parse_comment_line("i=-12 f=1.5 e=1.5d3 g=.5 h=1. b=T c=false s=Si").unwrap();
    assert_eq!(line.info.get("i"), Some(&Value::Int(-12)));
    assert_eq!(line.info.get("f"), Some(&Value::Float(1.5)));
    assert_eq!(line.info.get("e"), Some(&Value::Float(1500.0)));
    assert_eq!(line.info.get("g"), Some(&Value::Float(0.5)));
    assert_eq!(line.info.get("h"), Some(&Value::Float(1.0)));
    assert_eq!(line.info.get("b"), Some(&Value::Bool(true)));
    assert_eq!(line.info.get("c"), Some(&Value::Bool(false)));
    assert_eq!(line.info.get("s"), Some(&Value::from("Si")));
}

#[test]
fn test_all_bool_spellings() {
    for (text, expected) in [
        ("T", true),
        ("true", true),
        ("True", true),
        ("TRUE", true),
        ("F", false),
        ("false", false),
        ("False", false),
        ("FALSE", false),
    ] {
        assert_eq!(value(&format!("b={}", text), "b"), Value::Bool(expected), "{}", text);
    }
}

#[test]
fn test_near_miss_literals_are_strings() {
    for text in ["TRuE", "1.3k7", "-2.75e", "0012.1e-6", "Tx", "1-2", "+"] {
        assert_eq!(value(&format!("a={}", text), "a"), Value::from(text), "{}", text);
    }
}

#[test]
fn test_integer_overflow_reads_as_float() {
    assert_eq!(value("a=99999999999999999999", "a"), Value::Float(1e20));
    assert_eq!(value("a=-9223372036854775808", "a"), Value::Int(i64::MIN));
}

#[test]
fn test_legacy_and_modern_arrays_agree() {
    let expected = Value::IntArray(vec![1, 2, 3]);
    assert_eq!(value("a=\"1 2 3\"", "a"), expected);
    assert_eq!(value("a={1 2 3}", "a"), expected);
    assert_eq!(value("a=[1, 2, 3]", "a"), expected);
    assert_eq!(value("a=[ 1 ,2,  3 ]", "a"), expected);
}

#[test]
fn test_promotion() {
    assert_eq!(value("a=[1, 2, 3.0]", "a"), Value::FloatArray(vec![1.0, 2.0, 3.0]));
    assert_eq!(value("a=[1, \"a\", T]", "a"), Value::from(vec!["1", "a", "T"]));
    assert_eq!(value("a=[T, F]", "a"), Value::BoolArray(vec![true, false]));
    assert_eq!(value("a=\"1 2.5\"", "a"), Value::FloatArray(vec![1.0, 2.5]));
    assert_eq!(value("a={1 x}", "a"), Value::from(vec!["1", "x"]));
}

#[test]
fn test_ambiguous_double_quoted_is_string() {
    assert_eq!(value("a=\"1 T\"", "a"), Value::from("1 T"));
    assert_eq!(value("a=\"hello world\"", "a"), Value::from("hello world"));
}

#[test]
fn test_braces_hold_string_arrays() {
    assert_eq!(value("a={hello world}", "a"), Value::from(vec!["hello", "world"]));
    assert_eq!(value("a={x}", "a"), Value::from("x"));
    assert_eq!(value("a={}", "a"), Value::from(""));
}

#[test]
fn test_space_separated_brackets_are_string() {
    assert_eq!(value("a=[hello world]", "a"), Value::from("hello world"));
}

#[test]
fn test_quoted_escapes() {
    assert_eq!(value(r#"a="say \"hi\"""#, "a"), Value::from("say \"hi\""));
    assert_eq!(value(r#"a="one\ntwo""#, "a"), Value::from("one\ntwo"));
    assert_eq!(value(r#"a="back\\slash""#, "a"), Value::from("back\\slash"));
    assert_eq!(value(r"a=[inner \] bracket]", "a"), Value::from("inner ] bracket"));
    assert_eq!(value(r"a={inner \} brace}", "a"), Value::from(vec!["inner", "}", "brace"]));
    assert_eq!(value(r#"a={has "quotes"}"#, "a"), Value::from(vec!["has", "quotes"]));
}

#[test]
fn test_bare_escapes() {
    assert_eq!(value(r"a=x\ y", "a"), Value::from("x y"));
    assert_eq!(value(r"a=\q", "a"), Value::from("q"));
}

#[test]
fn test_nested_arrays() {
    let m = Matrix::from_rows(vec![vec![1, 2], vec![3, 4]]).unwrap();
    assert_eq!(value("a=[[1, 2], [3, 4]]", "a"), Value::IntMatrix(m.clone()));
    assert_eq!(value("a=[[1,2] [3,4]]", "a"), Value::IntMatrix(m));

    let f = Matrix::from_rows(vec![vec![1.0, 2.0], vec![3.5, 4.0]]).unwrap();
    assert_eq!(value("a=[[1, 2], [3.5, 4]]", "a"), Value::FloatMatrix(f));

    let s = Matrix::from_rows(vec![
        vec!["1".to_string(), "a".to_string()],
        vec!["2".to_string(), "3".to_string()],
    ])
    .unwrap();
    assert_eq!(value("a=[[1, a], [2, 3]]", "a"), Value::StrMatrix(s));
}

#[test]
fn test_ragged_nested_array() {
    assert!(matches!(
        parse_comment_line("a=[[1, 2], [3]]"),
        Err(Error::Shape { .. })
    ));
}

#[test]
fn test_legacy_nine_becomes_matrix() {
    let m = value("virial=\"1 2 3 4 5 6 7 8 9\"", "virial");
    assert_eq!(m.shape(), vec![3, 3]);
    if let Value::IntMatrix(m) = m {
        assert_eq!(m.row(0), Some(&[1, 4, 7][..]));
    } else {
        panic!("expected integer matrix");
    }
}

#[test]
fn test_legacy_single_element() {
    assert_eq!(value("a=\"3.5\"", "a"), Value::Float(3.5));
    assert_eq!(value("a=\"F\"", "a"), Value::Bool(false));
}

#[test]
fn test_lattice_shapes() {
    let identity = Lattice([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);
    let line = parse_comment_line("Lattice=\"1 0 0 0 1 0 0 0 1\"").unwrap();
    assert_eq!(line.lattice, Some(identity));
    assert!(line.info.is_empty());

    let line = parse_comment_line("Lattice=[2,3,4]").unwrap();
    assert_eq!(line.lattice, Some(Lattice::diagonal(2.0, 3.0, 4.0)));

    let line = parse_comment_line("Lattice=\"1 2 3 4 5 6 7 8 9\"").unwrap();
    assert_eq!(
        line.lattice,
        Some(Lattice([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]]))
    );

    let line = parse_comment_line("lattice=[[1, 2, 3], [4, 5, 6], [7, 8, 9]]").unwrap();
    assert_eq!(
        line.lattice,
        Some(Lattice([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]]))
    );
}

#[test]
fn test_bad_lattice() {
    for line in ["Lattice=\"1 2\"", "Lattice=abc", "Lattice=[[1, 2], [3, 4]]", "Lattice=\"T T T\""] {
        assert!(
            matches!(parse_comment_line(line), Err(Error::Shape { .. })),
            "{}",
            line
        );
    }
}

#[test]
fn test_properties() {
    let line = parse_comment_line("Properties=species:S:1:pos:R:3").unwrap();
    let schema = line.properties.unwrap();
    assert_eq!(schema.specs()[0].name, "species");
    assert_eq!(schema.specs()[1].columns, 3);
    assert!(line.info.is_empty());

    let quoted = parse_comment_line("Properties=\"species:S:1:pos:R:3\"").unwrap();
    assert_eq!(quoted.properties, Some(schema));
}

#[test]
fn test_malformed_properties() {
    for line in [
        "Properties=species:S",
        "Properties=species:Q:1",
        "Properties=1",
        "Properties=",
        "Properties=[1, 2]",
        "Properties=a:R:4000000000",
        "Properties=a:R:3000:b:R:3000",
    ] {
        assert!(
            matches!(parse_comment_line(line), Err(Error::Schema { .. })),
            "{}",
            line
        );
    }
}

#[test]
fn test_missing_equals() {
    match parse_comment_line("i 5").unwrap_err() {
        Error::Syntax {
            position, expected, ..
        } => {
            assert_eq!(position, 0);
            assert!(expected.iter().any(|e| e == "="));
        }
        other => panic!("expected syntax error, got {:?}", other),
    }
}

#[test]
fn test_empty_value_is_syntax_error() {
    assert!(parse_comment_line("a=").unwrap_err().is_syntax());
    assert!(parse_comment_line("a=1 =2").unwrap_err().is_syntax());
    assert!(parse_comment_line("a=\"unterminated").unwrap_err().is_syntax());
}

#[test]
fn test_duplicate_key() {
    assert_eq!(
        parse_comment_line("a=1 a=2").unwrap_err(),
        Error::duplicate_key("a")
    );
    assert!(matches!(
        parse_comment_line("Properties=a:S:1 properties=b:S:1"),
        Err(Error::DuplicateKey { .. })
    ));
}

#[test]
fn test_whitespace_around_equals() {
    let line = parse_comment_line("bob = 2 joe= 3 sam =4  ").unwrap();
    assert_eq!(line.info.len(), 3);
    assert_eq!(line.info.get("joe"), Some(&Value::Int(3)));
}

#[test]
fn test_quoted_keys() {
    let line = parse_comment_line(r#""two words"=1 {brace key}=2 [bracket key]=3"#).unwrap();
    assert_eq!(line.info.get("two words"), Some(&Value::Int(1)));
    assert_eq!(line.info.get("brace key"), Some(&Value::Int(2)));
    assert_eq!(line.info.get("bracket key"), Some(&Value::Int(3)));
}

#[test]
fn test_unicode_strings() {
    assert_eq!(value("unit=Ångström", "unit"), Value::from("Ångström"));
}

#[test]
fn test_order_preserved() {
    let line = parse_comment_line("z=1 a=2 m=3").unwrap();
    assert_eq!(line.info.keys().collect::<Vec<_>>(), vec!["z", "a", "m"]);
}

#[test]
fn test_trailing_newline_ignored() {
    assert_eq!(value("a=1\r\n", "a"), Value::Int(1));
}

#[test]
fn test_full_line_roundtrip() {
    let text = "Lattice=\"5.44 0.0 0.0 0.0 5.44 0.0 0.0 0.0 5.44\" \
                Properties=species:S:1:pos:R:3:forces:R:3 energy=-10.25 \
                config_type=\"diamond cubic\" pbc=\"T T T\" stress=\"1 0 0 0 1 0 0 0 1\" step=10";
    let line = parse_comment_line(text).unwrap();
    let written = write_comment_line(&line).unwrap();
    assert_eq!(parse_comment_line(&written).unwrap(), line);
    assert!(written.ends_with("Properties=species:S:1:pos:R:3:forces:R:3"));
}
