//! # JSON Type Taxonomy
//!
//! The seven primitive types of JSON Schema draft-07. Schema `type`
//! keywords parse into `JsonType`, and every runtime value classifies into
//! exactly one of them via [`JsonType::of`].
//!
//! `integer` is a subset of `number`: a value classifies as `Integer` when
//! it has no fractional part, and `Number` otherwise. [`JsonType::accepts`]
//! encodes the subset relation.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

/// A JSON Schema primitive type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JsonType {
    /// `null`.
    Null,
    /// `true` / `false`.
    Boolean,
    /// A number with no fractional part.
    Integer,
    /// Any number.
    Number,
    /// A UTF-8 string.
    String,
    /// An ordered list.
    Array,
    /// A string-keyed map.
    Object,
}

impl JsonType {
    /// All types, in the order JSON Schema lists them.
    pub fn all() -> &'static [JsonType] {
        &[
            Self::Null,
            Self::Boolean,
            Self::Integer,
            Self::Number,
            Self::String,
            Self::Array,
            Self::Object,
        ]
    }

    /// The JSON Schema keyword for this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        }
    }

    /// Classify a runtime value. Numbers without a fractional part are
    /// `Integer`, including `1.0`.
    pub fn of(value: &Value) -> JsonType {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Boolean,
            Value::Number(n) => {
                let whole = n.is_i64()
                    || n.is_u64()
                    || n.as_f64().is_some_and(|f| f.fract() == 0.0);
                if whole {
                    Self::Integer
                } else {
                    Self::Number
                }
            }
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }

    /// Whether a value satisfies this declared type.
    pub fn accepts(&self, value: &Value) -> bool {
        let actual = Self::of(value);
        match self {
            Self::Number => matches!(actual, Self::Number | Self::Integer),
            declared => *declared == actual,
        }
    }
}

impl std::fmt::Display for JsonType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JsonType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "null" => Ok(Self::Null),
            "boolean" => Ok(Self::Boolean),
            "integer" => Ok(Self::Integer),
            "number" => Ok(Self::Number),
            "string" => Ok(Self::String),
            "array" => Ok(Self::Array),
            "object" => Ok(Self::Object),
            other => Err(format!("unknown JSON type: {other:?}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn as_str_roundtrip() {
        for t in JsonType::all() {
            let parsed: JsonType = t.as_str().parse().unwrap();
            assert_eq!(*t, parsed);
        }
    }

    #[test]
    fn from_str_is_case_sensitive() {
        assert!("String".parse::<JsonType>().is_err());
        assert!("".parse::<JsonType>().is_err());
    }

    #[test]
    fn classify_values() {
        assert_eq!(JsonType::of(&json!(null)), JsonType::Null);
        assert_eq!(JsonType::of(&json!(true)), JsonType::Boolean);
        assert_eq!(JsonType::of(&json!(7)), JsonType::Integer);
        assert_eq!(JsonType::of(&json!(-7)), JsonType::Integer);
        assert_eq!(JsonType::of(&json!(7.0)), JsonType::Integer);
        assert_eq!(JsonType::of(&json!(7.5)), JsonType::Number);
        assert_eq!(JsonType::of(&json!("7")), JsonType::String);
        assert_eq!(JsonType::of(&json!([7])), JsonType::Array);
        assert_eq!(JsonType::of(&json!({"a": 7})), JsonType::Object);
    }

    #[test]
    fn number_accepts_integers_but_not_the_reverse() {
        assert!(JsonType::Number.accepts(&json!(3)));
        assert!(JsonType::Number.accepts(&json!(3.25)));
        assert!(!JsonType::Integer.accepts(&json!(3.25)));
        assert!(JsonType::Integer.accepts(&json!(3)));
    }

    #[test]
    fn booleans_are_not_numbers() {
        assert!(!JsonType::Integer.accepts(&json!(true)));
        assert!(!JsonType::Number.accepts(&json!(false)));
    }

    #[test]
    fn serde_format_matches_as_str() {
        for t in JsonType::all() {
            let json = serde_json::to_string(t).unwrap();
            assert_eq!(json, format!("\"{}\"", t.as_str()));
        }
    }
}
