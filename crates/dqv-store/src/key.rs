//! Store keys and key validation.
//!
//! A store accepts either plain text keys or structured
//! [`ResourceIdentifier`]s, never both: each store is configured with the
//! [`KeyKind`] it expects and its [`KeyValidator`] rejects the other kind.
//! Both kinds map to a backend key string, with identifier parts joined by
//! `/`.

use std::fmt;

use dqv_types::BatchFingerprint;
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Separator between identifier parts in a backend key.
pub const KEY_SEPARATOR: char = '/';

/// The kind of key a store accepts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyKind {
    #[default]
    Text,
    Identifier,
}

impl fmt::Display for KeyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Identifier => f.write_str("identifier"),
        }
    }
}

/// An ordered tuple of non-empty parts naming a stored resource, such as
/// `(partition_id, content_hash)` for a batch.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResourceIdentifier {
    parts: Vec<String>,
}

impl ResourceIdentifier {
    /// Build an identifier. Parts must be non-empty and free of `/`.
    pub fn new<I, S>(parts: I) -> StoreResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let parts: Vec<String> = parts.into_iter().map(Into::into).collect();
        if parts.is_empty() {
            return Err(StoreError::InvalidKey {
                key: String::new(),
                reason: "identifier must have at least one part".into(),
            });
        }
        for part in &parts {
            if part.is_empty() || part.contains(KEY_SEPARATOR) {
                return Err(StoreError::InvalidKey {
                    key: parts.join("/"),
                    reason: format!(
                        "identifier part {part:?} must be non-empty and contain no '/'"
                    ),
                });
            }
        }
        Ok(Self { parts })
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// The backend key: parts joined by `/`.
    pub fn to_key_string(&self) -> String {
        self.parts.join("/")
    }

    /// Inverse of [`to_key_string`](Self::to_key_string).
    pub fn from_key_string(s: &str) -> StoreResult<Self> {
        Self::new(s.split(KEY_SEPARATOR))
    }
}

impl fmt::Display for ResourceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.parts.join(", "))
    }
}

impl TryFrom<&BatchFingerprint> for ResourceIdentifier {
    type Error = StoreError;

    fn try_from(fingerprint: &BatchFingerprint) -> StoreResult<Self> {
        let (partition_id, content_hash) = fingerprint.to_tuple();
        Self::new([partition_id, content_hash])
    }
}

/// A key passed to a store operation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum StoreKey {
    Text(String),
    Identifier(ResourceIdentifier),
}

impl StoreKey {
    pub fn kind(&self) -> KeyKind {
        match self {
            Self::Text(_) => KeyKind::Text,
            Self::Identifier(_) => KeyKind::Identifier,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Identifier(_) => None,
        }
    }

    pub fn as_identifier(&self) -> Option<&ResourceIdentifier> {
        match self {
            Self::Identifier(id) => Some(id),
            Self::Text(_) => None,
        }
    }

    pub fn to_key_string(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Identifier(id) => id.to_key_string(),
        }
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Identifier(id) => write!(f, "{id}"),
        }
    }
}

impl From<&str> for StoreKey {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for StoreKey {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&String> for StoreKey {
    fn from(s: &String) -> Self {
        Self::Text(s.clone())
    }
}

impl From<ResourceIdentifier> for StoreKey {
    fn from(id: ResourceIdentifier) -> Self {
        Self::Identifier(id)
    }
}

impl From<&StoreKey> for StoreKey {
    fn from(key: &StoreKey) -> Self {
        key.clone()
    }
}

/// Checks keys against the kind a store expects and converts them to and
/// from backend key strings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyValidator {
    expected: KeyKind,
}

impl KeyValidator {
    pub fn new(expected: KeyKind) -> Self {
        Self { expected }
    }

    pub fn expected(&self) -> KeyKind {
        self.expected
    }

    pub fn validate(&self, key: &StoreKey) -> StoreResult<()> {
        let actual = key.kind();
        if actual != self.expected {
            return Err(StoreError::KeyKind {
                expected: self.expected,
                actual,
            });
        }
        Ok(())
    }

    /// Validate `key` and return its backend key string.
    pub fn encode(&self, key: &StoreKey) -> StoreResult<String> {
        self.validate(key)?;
        Ok(key.to_key_string())
    }

    /// Rebuild a key of the expected kind from a backend key string.
    pub fn decode(&self, raw: String) -> StoreResult<StoreKey> {
        match self.expected {
            KeyKind::Text => Ok(StoreKey::Text(raw)),
            KeyKind::Identifier => {
                ResourceIdentifier::from_key_string(&raw).map(StoreKey::Identifier)
            }
        }
    }
}

impl Default for KeyValidator {
    fn default() -> Self {
        Self::new(KeyKind::Text)
    }
}
