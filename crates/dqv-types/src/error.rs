use thiserror::Error;

use crate::policy::{BatchKwargsKind, DatasourceFamily};

/// Errors produced while building or checking batch kwargs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BatchError {
    /// The input could not be read as a kwargs mapping.
    #[error("batch kwargs must be a mapping, got {0}")]
    NotAMapping(String),

    /// A kwargs mapping failed its kind's required-field or type check.
    #[error("invalid {kind} batch kwargs: {reason}")]
    InvalidBatchKwargs {
        kind: BatchKwargsKind,
        reason: String,
    },

    /// A batch id is missing its timestamp or carries an unusable one.
    #[error("invalid batch id: {reason}")]
    InvalidBatchId { reason: String },

    /// The kwargs kind is not accepted by the requested datasource family.
    #[error("{kind} batch kwargs are not supported by the {family} datasource family")]
    UnsupportedFamily {
        kind: BatchKwargsKind,
        family: DatasourceFamily,
    },

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result alias for batch operations.
pub type BatchResult<T> = Result<T, BatchError>;
