use crate::key::KeyKind;

/// Errors from store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The key is not of the kind the store was configured for.
    #[error("store expects {expected} keys, got a {actual} key")]
    KeyKind { expected: KeyKind, actual: KeyKind },

    /// The key is of the right kind but cannot be stored.
    #[error("invalid key {key:?}: {reason}")]
    InvalidKey { key: String, reason: String },

    /// No value is stored under the key.
    #[error("key not found: {0}")]
    NotFound(String),

    /// No serializer is registered under the tag.
    #[error("unknown serialization type: {0}")]
    UnknownSerializationType(String),

    /// The `none` serializer can only store textual values.
    #[error("value must be a string when stored without serialization")]
    NotText,

    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The store configuration could not be read.
    #[error("invalid store configuration: {0}")]
    Config(String),

    #[error("store lock poisoned")]
    LockPoisoned,
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
