//! Frontmatter codec
//!
//! A deliberately small YAML subset. The grammar is one entry per line:
//!
//! ```text
//! entry := key ": " scalar
//!        | key ": []"
//!        | key ":" NEWLINE ("  - " scalar NEWLINE)+
//! scalar := bare | '"' escaped '"' | "'" text "'"
//! ```
//!
//! Bare scalars are typed on decode (`true`/`false`, `null`/`undefined`,
//! integers, floats); quoted scalars are always strings. The encoder quotes
//! any string whose bare form would be read back differently, so that
//! `decode(encode(v)) == v` for every value the codec supports.

mod decode;
mod encode;
#[cfg(test)]
mod tests;

use std::fmt;

pub use decode::decode;
pub use encode::encode;

/// A single frontmatter value
#[derive(Debug, Clone, PartialEq)]
pub enum FrontmatterValue {
    String(String),
    Bool(bool),
    Integer(i64),
    Float(f64),
    List(Vec<String>),
    Null,
}

impl FrontmatterValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FrontmatterValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FrontmatterValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Convert into an untyped JSON value (used at the cleaner boundary)
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            FrontmatterValue::String(s) => serde_json::Value::String(s.clone()),
            FrontmatterValue::Bool(b) => serde_json::Value::Bool(*b),
            FrontmatterValue::Integer(i) => serde_json::Value::from(*i),
            FrontmatterValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            FrontmatterValue::List(items) => serde_json::Value::Array(
                items
                    .iter()
                    .map(|s| serde_json::Value::String(s.clone()))
                    .collect(),
            ),
            FrontmatterValue::Null => serde_json::Value::Null,
        }
    }
}

impl From<&str> for FrontmatterValue {
    fn from(s: &str) -> Self {
        FrontmatterValue::String(s.to_string())
    }
}

impl From<String> for FrontmatterValue {
    fn from(s: String) -> Self {
        FrontmatterValue::String(s)
    }
}

impl From<bool> for FrontmatterValue {
    fn from(b: bool) -> Self {
        FrontmatterValue::Bool(b)
    }
}

impl From<i64> for FrontmatterValue {
    fn from(i: i64) -> Self {
        FrontmatterValue::Integer(i)
    }
}

impl From<f64> for FrontmatterValue {
    fn from(f: f64) -> Self {
        FrontmatterValue::Float(f)
    }
}

impl From<Vec<String>> for FrontmatterValue {
    fn from(items: Vec<String>) -> Self {
        FrontmatterValue::List(items)
    }
}

impl fmt::Display for FrontmatterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrontmatterValue::String(s) => write!(f, "{}", s),
            FrontmatterValue::Bool(b) => write!(f, "{}", b),
            FrontmatterValue::Integer(i) => write!(f, "{}", i),
            FrontmatterValue::Float(x) => write!(f, "{}", x),
            FrontmatterValue::List(items) => write!(f, "[{}]", items.join(", ")),
            FrontmatterValue::Null => write!(f, "null"),
        }
    }
}

/// Ordered key-value mapping.
///
/// Keys keep insertion order; inserting an existing key replaces its value in
/// place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frontmatter {
    entries: Vec<(String, FrontmatterValue)>,
}

impl Frontmatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FrontmatterValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Insert only when a value is present; absent values are omitted
    pub fn insert_opt<V: Into<FrontmatterValue>>(&mut self, key: impl Into<String>, value: Option<V>) {
        if let Some(value) = value {
            self.insert(key, value);
        }
    }

    /// Builder form of [`Frontmatter::insert`]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FrontmatterValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&FrontmatterValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// String value of a key, if it is a string
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FrontmatterValue::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FrontmatterValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
