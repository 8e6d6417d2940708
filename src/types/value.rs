//! Dynamically-typed script values

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A value held by a variable scope or carried by an action.
///
/// Scripts are authored in JSON, so values arrive as numbers, strings,
/// booleans, string lists, or null. Anything else is rejected when the
/// action is decoded.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<String>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Name of the variant, used in type mismatch reports.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::List(_) => "list",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) if is_integral(*n) => write!(f, "{}", *n as i64),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "{s}"),
            Value::List(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value as f64)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<Vec<String>> for Value {
    fn from(value: Vec<String>) -> Self {
        Value::List(value)
    }
}

/// Whole and exactly representable as `i64`. `i64::MAX as f64` rounds up to
/// 2^63, so the upper bound is exclusive.
fn is_integral(n: f64) -> bool {
    n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            // Whole numbers go out as JSON integers so saved records stay readable.
            Value::Number(n) if is_integral(*n) => serializer.serialize_i64(*n as i64),
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::String(s) => serializer.serialize_str(s),
            Value::List(items) => items.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Bool(bool),
            Number(f64),
            String(String),
            List(Vec<String>),
        }

        let raw: Option<Raw> = Option::deserialize(deserializer).map_err(|_| {
            serde::de::Error::custom("expected null, bool, number, string or list of strings")
        })?;
        Ok(match raw {
            None => Value::Null,
            Some(Raw::Bool(b)) => Value::Bool(b),
            Some(Raw::Number(n)) => Value::Number(n),
            Some(Raw::String(s)) => Value::String(s),
            Some(Raw::List(items)) => Value::List(items),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_every_supported_json_shape() {
        let values: Vec<Value> =
            serde_json::from_str(r#"[null, true, 5, 2.5, "gold", ["a", "b"]]"#).unwrap();
        assert_eq!(
            values,
            vec![
                Value::Null,
                Value::Bool(true),
                Value::Number(5.0),
                Value::Number(2.5),
                Value::String("gold".to_string()),
                Value::List(vec!["a".to_string(), "b".to_string()]),
            ]
        );
    }

    #[test]
    fn rejects_objects() {
        let result: Result<Value, _> = serde_json::from_str(r#"{"nested": 1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn whole_numbers_serialize_as_integers() {
        assert_eq!(serde_json::to_string(&Value::Number(5.0)).unwrap(), "5");
        assert_eq!(serde_json::to_string(&Value::Number(1.5)).unwrap(), "1.5");
        assert_eq!(Value::Number(15.0).to_string(), "15");
    }

    #[test]
    fn numbers_beyond_i64_keep_their_value() {
        let big = Value::Number(2f64.powi(63));
        let json = serde_json::to_string(&big).unwrap();
        assert_ne!(json, i64::MAX.to_string());
        assert_eq!(serde_json::from_str::<Value>(&json).unwrap(), big);

        let min = Value::Number(i64::MIN as f64);
        assert_eq!(serde_json::to_string(&min).unwrap(), i64::MIN.to_string());
    }
}
