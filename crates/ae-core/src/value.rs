//! Value model shared by providers, variables and action results
//!
//! `Value` mirrors the JSON data model and adds two kinds JSON cannot carry
//! verbatim: raw binary payloads and files (name + bytes).

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A file value: a name and its byte content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileValue {
    pub name: String,
    pub content: Vec<u8>,
}

impl FileValue {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// A dynamically typed value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    Array(Vec<Value>),
    Object(IndexMap<String, Value>),
    Binary(Vec<u8>),
    File(FileValue),
}

impl Value {
    /// Empty object
    pub fn object() -> Self {
        Value::Object(IndexMap::new())
    }

    /// Name of the value kind, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Binary(_) => "binary",
            Value::File(_) => "file",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Whether the value is a scalar that cannot hold nested values
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Value::Bool(_) | Value::Number(_) | Value::String(_) | Value::Binary(_)
        )
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Binary(bytes) => Some(bytes),
            Value::File(file) => Some(&file.content),
            _ => None,
        }
    }

    /// Descend one level: object key, array index, or a file field
    pub fn get(&self, segment: &str) -> Option<&Value> {
        match self {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        }
    }

    /// Descend through all segments, materialising file fields on the way
    pub fn lookup<S: AsRef<str>>(&self, segments: &[S]) -> Option<Value> {
        let Some((first, rest)) = segments.split_first() else {
            return Some(self.clone());
        };
        match self {
            Value::File(file) => {
                let field = match first.as_ref() {
                    "fileName" => Value::String(file.name.clone()),
                    "content" => Value::Binary(file.content.clone()),
                    _ => return None,
                };
                field.lookup(rest)
            }
            _ => self.get(first.as_ref())?.lookup(rest),
        }
    }

    /// Convert to plain JSON, encoding binary content as base64
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Value::Number(n.clone()),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Object(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
            Value::Binary(bytes) => serde_json::Value::String(BASE64.encode(bytes)),
            Value::File(file) => serde_json::json!({
                "fileName": file.name,
                "content": BASE64.encode(&file.content),
            }),
        }
    }

    /// Text rendering used by text comparisons
    pub fn to_text(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            Value::File(file) => file.name.clone(),
            other => other.to_json().to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(value.into())
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::Number(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        serde_json::Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or(Value::Null)
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

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(value: IndexMap<String, Value>) -> Self {
        Value::Object(value)
    }
}

impl From<FileValue> for Value {
    fn from(value: FileValue) -> Self {
        Value::File(value)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => n.serialize(serializer),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Object(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
            Value::Binary(bytes) => serializer.serialize_str(&BASE64.encode(bytes)),
            Value::File(file) => {
                let mut out = serializer.serialize_map(Some(2))?;
                out.serialize_entry("fileName", &file.name)?;
                out.serialize_entry("content", &BASE64.encode(&file.content))?;
                out.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_preserves_order() {
        let value = Value::from(json!({"b": 1, "a": {"c": [true, null]}}));
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(value.lookup(&["a", "c", "0"]), Some(Value::Bool(true)));
    }

    #[test]
    fn test_lookup_into_file() {
        let value = Value::from(FileValue::new("quote.pdf", vec![1u8, 2, 3]));
        assert_eq!(
            value.lookup(&["fileName"]),
            Some(Value::String("quote.pdf".into()))
        );
        assert_eq!(value.lookup(&["content"]), Some(Value::Binary(vec![1, 2, 3])));
        assert_eq!(value.lookup(&["size"]), None);
    }

    #[test]
    fn test_binary_serializes_as_base64() {
        let value = Value::Binary(b"hello".to_vec());
        assert_eq!(serde_json::to_value(&value).unwrap(), json!("aGVsbG8="));
    }

    #[test]
    fn test_integral_float_as_i64() {
        assert_eq!(Value::from(3.0).as_i64(), Some(3));
        assert_eq!(Value::from(3.5).as_i64(), None);
    }

    #[test]
    fn test_is_primitive() {
        assert!(Value::from("x").is_primitive());
        assert!(Value::from(1i64).is_primitive());
        assert!(!Value::object().is_primitive());
        assert!(!Value::Null.is_primitive());
    }
}
