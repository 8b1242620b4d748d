// src/value.rs

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single cell as handed over by a row source.
///
/// `Empty` is a real value: sources must emit it for blank/missing cells so
/// positions stay aligned with the header when zipping. Sources that already
/// deliver native types (a spreadsheet grid, say) use the typed variants;
/// plain-text sources emit `Text` for everything non-blank.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Empty,
    Bool(bool),
    Int(i64),
    Float(f64),
    DateTime(NaiveDateTime),
    Text(String),
}

impl Value {
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Empty => true,
            Value::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// The textual content, for cells that have one. Header matching only
    /// considers text cells; a numeric cell never names a column.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            Value::Empty
        } else {
            Value::Text(s.to_string())
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        if s.is_empty() {
            Value::Empty
        } else {
            Value::Text(s)
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_detection() {
        assert!(Value::Empty.is_empty());
        assert!(Value::Text(String::new()).is_empty());
        assert!(!Value::Text("x".into()).is_empty());
        assert!(!Value::Int(0).is_empty());
    }

    #[test]
    fn from_str_collapses_blank_to_empty() {
        assert_eq!(Value::from(""), Value::Empty);
        assert_eq!(Value::from("a"), Value::Text("a".into()));
    }

    #[test]
    fn display_renders_key_material() {
        assert_eq!(Value::Text("Bob".into()).to_string(), "Bob");
        assert_eq!(Value::Int(30).to_string(), "30");
        assert_eq!(Value::Empty.to_string(), "");
    }
}
