//! The generic batch kwargs mapping.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{BatchError, BatchResult};
use crate::frame::FrameHandle;

/// Key wrapping a frame handle in the canonical form of a kwargs value.
pub const FRAME_TAG: &str = "$frame";

/// A single kwargs value: plain JSON data, or a handle to an in-memory frame.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BatchValue {
    Json(Value),
    Frame(FrameHandle),
}

impl BatchValue {
    /// The value as a string slice, if it is a JSON string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Json(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(v) => Some(v),
            Self::Frame(_) => None,
        }
    }

    pub fn as_frame(&self) -> Option<&FrameHandle> {
        match self {
            Self::Frame(h) => Some(h),
            Self::Json(_) => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Json(Value::Null))
    }

    /// The value as hashed by fingerprinting. Frames are wrapped under
    /// [`FRAME_TAG`] so they never collide with a JSON object of the same shape.
    pub fn to_canonical_json(&self) -> Value {
        match self {
            Self::Json(v) => v.clone(),
            Self::Frame(h) => {
                let mut frame = Map::new();
                frame.insert("kind".to_string(), Value::from(h.kind.as_str()));
                frame.insert("name".to_string(), Value::from(h.name.as_str()));
                let mut tagged = Map::new();
                tagged.insert(FRAME_TAG.to_string(), Value::Object(frame));
                Value::Object(tagged)
            }
        }
    }
}

/// Strings render bare; everything else renders as its JSON text.
impl fmt::Display for BatchValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(Value::String(s)) => f.write_str(s),
            Self::Json(v) => write!(f, "{v}"),
            Self::Frame(h) => write!(f, "{h}"),
        }
    }
}

impl From<Value> for BatchValue {
    fn from(v: Value) -> Self {
        Self::Json(v)
    }
}

impl From<&str> for BatchValue {
    fn from(s: &str) -> Self {
        Self::Json(Value::String(s.to_string()))
    }
}

impl From<String> for BatchValue {
    fn from(s: String) -> Self {
        Self::Json(Value::String(s))
    }
}

impl From<u64> for BatchValue {
    fn from(n: u64) -> Self {
        Self::Json(Value::from(n))
    }
}

impl From<FrameHandle> for BatchValue {
    fn from(h: FrameHandle) -> Self {
        Self::Frame(h)
    }
}

/// Information a datasource needs to fetch one batch of data.
///
/// Batch kwargs are produced by a fetch orchestrator per request and are
/// read-only once handed to fingerprinting. Keys are kept in lexicographic
/// order. The type deliberately does not implement `PartialEq` or `Hash`:
/// batches are compared through their [`BatchFingerprint`](crate::BatchFingerprint).
#[derive(Clone, Debug, Default, Serialize)]
#[serde(transparent)]
pub struct BatchKwargs {
    fields: BTreeMap<String, BatchValue>,
}

impl BatchKwargs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build kwargs from a JSON value. Only objects are accepted.
    pub fn from_value(value: Value) -> BatchResult<Self> {
        match value {
            Value::Object(map) => Ok(map.into_iter().collect()),
            other => Err(BatchError::NotAMapping(json_type_name(&other).to_string())),
        }
    }

    /// Parse kwargs from JSON text.
    pub fn from_json_str(s: &str) -> BatchResult<Self> {
        let value: Value =
            serde_json::from_str(s).map_err(|e| BatchError::Serialization(e.to_string()))?;
        Self::from_value(value)
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<BatchValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a value, returning the previous one if the key was present.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<BatchValue>,
    ) -> Option<BatchValue> {
        self.fields.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<BatchValue> {
        self.fields.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&BatchValue> {
        self.fields.get(key)
    }

    /// A field's value if it is a JSON string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(BatchValue::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BatchValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Row limit requested for the batch, if any.
    pub fn limit(&self) -> Option<u64> {
        self.get("limit")
            .and_then(BatchValue::as_json)
            .and_then(Value::as_u64)
    }

    pub fn reader_method(&self) -> Option<&str> {
        self.get_str("reader_method")
    }
}

impl<K: Into<String>, V: Into<BatchValue>> FromIterator<(K, V)> for BatchKwargs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl TryFrom<Value> for BatchKwargs {
    type Error = BatchError;

    fn try_from(value: Value) -> BatchResult<Self> {
        Self::from_value(value)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
