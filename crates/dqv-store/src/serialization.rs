//! Serialization registry.
//!
//! Stores hold raw text; values are converted on the way in and out by a
//! [`Serializer`] looked up by tag. Two tags are always registered:
//!
//! - `none`: identity; only string values can be stored
//! - `json`: standard JSON text

use std::collections::HashMap;

use serde_json::Value;

use crate::error::{StoreError, StoreResult};

pub const NONE_TAG: &str = "none";
pub const JSON_TAG: &str = "json";

pub type EncodeFn = fn(&Value) -> StoreResult<String>;
pub type DecodeFn = fn(&str) -> StoreResult<Value>;

/// An encode/decode pair.
#[derive(Clone, Copy, Debug)]
pub struct Serializer {
    pub encode: EncodeFn,
    pub decode: DecodeFn,
}

impl Serializer {
    pub const NONE: Self = Self {
        encode: encode_none,
        decode: decode_none,
    };

    pub const JSON: Self = Self {
        encode: encode_json,
        decode: decode_json,
    };
}

/// Maps serialization tags to serializers.
#[derive(Clone, Debug)]
pub struct SerializationRegistry {
    serializers: HashMap<String, Serializer>,
}

impl SerializationRegistry {
    /// A registry holding the built-in `none` and `json` serializers.
    pub fn new() -> Self {
        let mut serializers = HashMap::new();
        serializers.insert(NONE_TAG.to_string(), Serializer::NONE);
        serializers.insert(JSON_TAG.to_string(), Serializer::JSON);
        Self { serializers }
    }

    /// Register a serializer, returning the one it replaced.
    pub fn register(
        &mut self,
        tag: impl Into<String>,
        serializer: Serializer,
    ) -> Option<Serializer> {
        self.serializers.insert(tag.into(), serializer)
    }

    pub fn serializer_for(&self, tag: &str) -> StoreResult<Serializer> {
        self.serializers
            .get(tag)
            .copied()
            .ok_or_else(|| StoreError::UnknownSerializationType(tag.to_string()))
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.serializers.contains_key(tag)
    }

    /// Registered tags, sorted.
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.serializers.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }

    /// Resolve the serializer for a call: the per-call override, else the
    /// store default, else `none`.
    pub fn resolve(&self, call: Option<&str>, default: Option<&str>) -> StoreResult<Serializer> {
        self.serializer_for(call.or(default).unwrap_or(NONE_TAG))
    }
}

impl Default for SerializationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn encode_none(value: &Value) -> StoreResult<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        _ => Err(StoreError::NotText),
    }
}

fn decode_none(raw: &str) -> StoreResult<Value> {
    Ok(Value::String(raw.to_string()))
}

fn encode_json(value: &Value) -> StoreResult<String> {
    serde_json::to_string(value).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn decode_json(raw: &str) -> StoreResult<Value> {
    serde_json::from_str(raw).map_err(|e| StoreError::Serialization(e.to_string()))
}
