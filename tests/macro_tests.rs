use extxyz::{document, parse_comment_line, write_document, CommentLine, Error, Lattice, Matrix, Value};

#[test]
fn test_document_macro_scalars() {
    let doc = document! {
        "step" => 12,
        "energy" => -3.25,
        "converged" => true,
        "config_type" => "bulk",
    };
    assert_eq!(doc.len(), 4);
    assert_eq!(
        write_document(&doc).unwrap(),
        "step=12 energy=-3.25 converged=T config_type=bulk"
    );
}

#[test]
fn test_document_macro_arrays() {
    let doc = document! {
        "pbc" => vec![true, false, true],
        "ids" => vec![1_i64, 2, 3],
        "names" => vec!["a", "two words"],
    };
    assert_eq!(
        write_document(&doc).unwrap(),
        r#"pbc=[T, F, T] ids=[1, 2, 3] names=[a, "two words"]"#
    );
}

#[test]
fn test_document_macro_owned_keys() {
    let key = format!("frame_{}", 7);
    let doc = document! { key.clone() => 1.5 };
    assert_eq!(doc.get(&key), Some(&Value::Float(1.5)));
}

#[test]
fn test_document_macro_overwrites() {
    let doc = document! { "a" => 1, "a" => 2 };
    assert_eq!(doc.len(), 1);
    assert_eq!(doc.get("a"), Some(&Value::Int(2)));
}

#[test]
fn test_document_macro_roundtrip() {
    let stress = Matrix::from_rows(vec![
        vec![1.0, 0.5, 0.0],
        vec![0.5, 2.0, 0.0],
        vec![0.0, 0.0, 3.0],
    ])
    .unwrap();
    let line = CommentLine::new(document! {
        "stress" => stress,
        "label" => "3",
        "note" => "1 2 3",
        "empty" => "",
    })
    .with_lattice(Lattice::diagonal(4.0, 4.0, 4.0));

    let text = extxyz::write_comment_line(&line).unwrap();
    assert!(text.contains(r#"label="\3""#), "{}", text);
    assert!(text.contains(r#"note="\1 2 3""#), "{}", text);
    assert!(text.contains(r#"empty="""#), "{}", text);
    assert_eq!(parse_comment_line(&text).unwrap(), line);
}

#[test]
fn test_document_macro_reserved_keys() {
    assert!(matches!(write_document(&document! { "properties" => 1 }), Err(Error::Format(_))));
    assert!(matches!(write_document(&document! { "Lattice" => 1 }), Err(Error::Format(_))));
}
