//! Normalizes list responses that arrive either as a bare JSON array or
//! wrapped in an object under a known key (`{"posts": [...]}`).

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::ApiError;

/// Shape of a list response.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    Bare(Vec<Value>),
    Wrapped { key: String, items: Vec<Value> },
}

impl Envelope {
    /// Classify `body`, accepting a bare array or an object holding an array
    /// under `key`. Any other shape is an error.
    pub fn parse(body: &[u8], key: &str) -> Result<Self, ApiError> {
        let value: Value = serde_json::from_slice(body)?;

        match value {
            Value::Array(items) => Ok(Envelope::Bare(items)),
            Value::Object(mut map) => match map.remove(key) {
                Some(Value::Array(items)) => Ok(Envelope::Wrapped {
                    key: key.to_string(),
                    items,
                }),
                Some(other) => Err(ApiError::Decode(format!(
                    "`{}` is {}, expected an array",
                    key,
                    kind(&other)
                ))),
                None => Err(ApiError::Decode(format!(
                    "object without `{}` key (keys: {})",
                    key,
                    map.keys().cloned().collect::<Vec<_>>().join(", ")
                ))),
            },
            other => Err(ApiError::Decode(format!(
                "expected an array or object, got {}",
                kind(&other)
            ))),
        }
    }

    pub fn into_items(self) -> Vec<Value> {
        match self {
            Envelope::Bare(items) | Envelope::Wrapped { items, .. } => items,
        }
    }

    /// Decode the items into `T`.
    pub fn decode<T: DeserializeOwned>(self) -> Result<Vec<T>, ApiError> {
        Ok(serde_json::from_value(Value::Array(self.into_items()))?)
    }
}

/// Decode a list response of either shape.
pub fn decode_list<T: DeserializeOwned>(body: &[u8], key: &str) -> Result<Vec<T>, ApiError> {
    Envelope::parse(body, key)?.decode()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
