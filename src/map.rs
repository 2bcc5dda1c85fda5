//! Ordered key/value map for comment-line entries.
//!
//! This module provides [`Document`], a wrapper around [`IndexMap`] that keeps
//! keys in the order they appeared on the comment line. The writer emits pairs
//! in insertion order, so a parsed line written back keeps its layout.
//!
//! ## Examples
//!
//! ```rust
//! use extxyz::{Document, Value};
//!
//! let mut doc = Document::new();
//! doc.try_insert("energy".to_string(), Value::from(-1.5)).unwrap();
//! doc.try_insert("config_type".to_string(), Value::from("bulk")).unwrap();
//!
//! assert!(doc.try_insert("energy".to_string(), Value::from(0.0)).is_err());
//! assert_eq!(doc.keys().collect::<Vec<_>>(), vec!["energy", "config_type"]);
//! ```

use crate::{Error, Result, Value};
use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// An insertion-ordered map of comment-line keys to values.
///
/// Keys are unique. [`Document::try_insert`] is what the parser uses and
/// rejects a repeated key; [`Document::insert`] overwrites, for building
/// documents programmatically.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document(IndexMap<String, Value>);

impl Document {
    #[must_use]
    pub fn new() -> Self {
        Document(IndexMap::new())
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Document(IndexMap::with_capacity(capacity))
    }

    /// Inserts a new key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateKey`] if `key` is already present; the
    /// document is left unchanged.
    pub fn try_insert(&mut self, key: String, value: Value) -> Result<()> {
        if self.0.contains_key(&key) {
            return Err(Error::duplicate_key(&key));
        }
        self.0.insert(key, value);
        Ok(())
    }

    /// Inserts a key-value pair, returning the previous value for `key`.
    pub fn insert(&mut self, key: String, value: Value) -> Option<Value> {
        self.0.insert(key, value)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Looks a key up ignoring ASCII case, as used for `Lattice` and `Properties`.
    #[must_use]
    pub fn get_ignore_case(&self, key: &str) -> Option<(&str, &Value)> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Removes `key`, keeping the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over the keys, in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Returns an iterator over the values, in insertion order.
    pub fn values(&self) -> indexmap::map::Values<'_, String, Value> {
        self.0.values()
    }

    /// Returns an iterator over the key-value pairs, in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.0.iter()
    }
}

impl Serialize for Document {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl IntoIterator for Document {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, Value)> for Document {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Document(IndexMap::from_iter(iter))
    }
}
