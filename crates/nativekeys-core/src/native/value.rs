//! Tagged value tree returned by the native signature call
//!
//! The native layer cannot give static guarantees about what it hands back,
//! so every value carries an explicit type tag on the wire:
//!
//! ```json
//! {"type": "map", "value": [
//!     [{"type": "str", "value": "a"}, {"type": "str", "value": "1"}],
//!     [{"type": "int", "value": 3},  {"type": "str", "value": "c"}]
//! ]}
//! ```
//!
//! Maps are encoded as a list of `[key, value]` pairs so that keys of any
//! type survive decoding and can be rejected later by the resolver.

use serde::{Deserialize, Serialize};

use super::error::NativeResult;

/// A value produced by the native layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum NativeValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    List(Vec<NativeValue>),
    Map(Vec<(NativeValue, NativeValue)>),
}

impl NativeValue {
    /// Decode a value from its JSON wire form
    pub fn from_json(raw: &str) -> NativeResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Encode this value in its JSON wire form
    pub fn to_json(&self) -> NativeResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Borrow the string payload, if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            NativeValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, NativeValue::Null)
    }

    /// Short name of the type tag, for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            NativeValue::Null => "null",
            NativeValue::Bool(_) => "bool",
            NativeValue::Int(_) => "int",
            NativeValue::Float(_) => "float",
            NativeValue::Str(_) => "str",
            NativeValue::Bytes(_) => "bytes",
            NativeValue::List(_) => "list",
            NativeValue::Map(_) => "map",
        }
    }
}

impl From<&str> for NativeValue {
    fn from(s: &str) -> Self {
        NativeValue::Str(s.to_string())
    }
}

impl From<String> for NativeValue {
    fn from(s: String) -> Self {
        NativeValue::Str(s)
    }
}

impl From<i64> for NativeValue {
    fn from(n: i64) -> Self {
        NativeValue::Int(n)
    }
}

impl From<bool> for NativeValue {
    fn from(b: bool) -> Self {
        NativeValue::Bool(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::NativeError;

    #[test]
    fn test_decode_mixed_map() {
        let raw = r#"{"type": "map", "value": [
            [{"type": "str", "value": "a"}, {"type": "str", "value": "1"}],
            [{"type": "str", "value": "b"}, {"type": "int", "value": 2}],
            [{"type": "int", "value": 3}, {"type": "str", "value": "c"}]
        ]}"#;

        let value = NativeValue::from_json(raw).unwrap();
        let NativeValue::Map(entries) = value else {
            panic!("expected a map");
        };
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0], (NativeValue::from("a"), NativeValue::from("1")));
        assert_eq!(entries[1].1, NativeValue::Int(2));
        assert_eq!(entries[2].0, NativeValue::Int(3));
    }

    #[test]
    fn test_decode_null() {
        let value = NativeValue::from_json(r#"{"type": "null"}"#).unwrap();
        assert!(value.is_null());
    }

    #[test]
    fn test_decode_rejects_untagged() {
        let err = NativeValue::from_json(r#"{"a": "1"}"#).unwrap_err();
        assert!(matches!(err, NativeError::MalformedResult(_)));

        let err = NativeValue::from_json(r#"{"type": "set", "value": []}"#).unwrap_err();
        assert!(matches!(err, NativeError::MalformedResult(_)));
    }

    #[test]
    fn test_encode_uses_tags() {
        let value = NativeValue::Map(vec![(NativeValue::from("sha256"), NativeValue::from("ab:cd"))]);
        let json = value.to_json().unwrap();
        assert!(json.contains(r#""type":"map""#));
        assert!(json.contains(r#""type":"str""#));
        assert_eq!(NativeValue::from_json(&json).unwrap(), value);
    }

    #[test]
    fn test_accessors() {
        assert_eq!(NativeValue::from("x").as_str(), Some("x"));
        assert_eq!(NativeValue::Int(1).as_str(), None);
        assert_eq!(NativeValue::Bytes(vec![1]).type_name(), "bytes");
        assert_eq!(NativeValue::from(true).type_name(), "bool");
    }
}
