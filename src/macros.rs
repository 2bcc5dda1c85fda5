/// Builds a [`Document`](crate::Document) from `key => value` pairs.
///
/// Values are converted with [`Value::from`](crate::Value), so anything with a
/// `From` impl works: numbers, bools, strings, vectors and matrices. Later
/// entries overwrite earlier ones with the same key.
///
/// ```rust
/// use extxyz::{document, Value};
///
/// let doc = document! {
///     "energy" => -10.25,
///     "step" => 3,
///     "pbc" => vec![true, true, true],
/// };
/// assert_eq!(doc.get("step"), Some(&Value::Int(3)));
/// ```
#[macro_export]
macro_rules! document {
    () => {
        $crate::Document::new()
    };

    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut doc = $crate::Document::new();
        $(
            doc.insert(::std::string::String::from($key), $crate::Value::from($value));
        )+
        doc
    }};
}
