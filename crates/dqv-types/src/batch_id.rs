//! Batch ids: kwargs describing the *output* of a fetch.

use serde_json::Value;

use crate::error::{BatchError, BatchResult};
use crate::fingerprint::{BatchFingerprint, Fingerprinter};
use crate::kwargs::{BatchKwargs, BatchValue};

const TIMESTAMP_KEY: &str = "timestamp";

/// Kwargs captured from a completed fetch, such as the time a query ran.
///
/// Unlike request kwargs a batch id has no required source field, but it
/// always carries a `timestamp` (a JSON string or number).
#[derive(Clone, Debug)]
pub struct BatchId {
    timestamp: Value,
    extra: BatchKwargs,
}

impl BatchId {
    pub fn new(mut kwargs: BatchKwargs) -> BatchResult<Self> {
        let timestamp = match kwargs.remove(TIMESTAMP_KEY) {
            Some(BatchValue::Json(v @ (Value::String(_) | Value::Number(_)))) => v,
            Some(BatchValue::Json(Value::Null)) | None => {
                return Err(BatchError::InvalidBatchId {
                    reason: "batch id requires a timestamp".into(),
                });
            }
            Some(other) => {
                return Err(BatchError::InvalidBatchId {
                    reason: format!("timestamp must be a string or number, got {other}"),
                });
            }
        };
        Ok(Self {
            timestamp,
            extra: kwargs,
        })
    }

    pub fn timestamp(&self) -> &Value {
        &self.timestamp
    }

    pub fn timestamp_str(&self) -> Option<&str> {
        self.timestamp.as_str()
    }

    /// Fields other than the timestamp.
    pub fn extra(&self) -> &BatchKwargs {
        &self.extra
    }

    /// The full mapping, timestamp included.
    pub fn to_kwargs(&self) -> BatchKwargs {
        self.extra
            .clone()
            .with(TIMESTAMP_KEY, self.timestamp.clone())
    }

    pub fn fingerprint(&self, fingerprinter: &Fingerprinter) -> BatchResult<BatchFingerprint> {
        fingerprinter.fingerprint(&self.to_kwargs())
    }
}

impl TryFrom<BatchKwargs> for BatchId {
    type Error = BatchError;

    fn try_from(kwargs: BatchKwargs) -> BatchResult<Self> {
        Self::new(kwargs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameHandle;
    use serde_json::json;

    #[test]
    fn requires_timestamp() {
        let err = BatchId::new(BatchKwargs::new().with("table", "t")).unwrap_err();
        assert!(matches!(err, BatchError::InvalidBatchId { .. }));
    }

    #[test]
    fn exposes_timestamp() {
        let id =
            BatchId::new(BatchKwargs::new().with("timestamp", "2020-01-01T00:00:00Z")).unwrap();
        assert_eq!(id.timestamp_str(), Some("2020-01-01T00:00:00Z"));
        assert!(id.extra().is_empty());
    }

    #[test]
    fn numeric_timestamp() {
        let id = BatchId::new(BatchKwargs::new().with("timestamp", json!(1577836800.5))).unwrap();
        assert_eq!(id.timestamp(), &json!(1577836800.5));
        assert_eq!(id.timestamp_str(), None);
    }

    #[test]
    fn rejects_null_and_structured_timestamps() {
        assert!(BatchId::new(BatchKwargs::new().with("timestamp", json!(null))).is_err());
        assert!(BatchId::new(BatchKwargs::new().with("timestamp", json!({"t": 1}))).is_err());
        assert!(
            BatchId::new(BatchKwargs::new().with("timestamp", FrameHandle::pandas("df"))).is_err()
        );
    }

    #[test]
    fn fingerprint_includes_timestamp() {
        let fp = Fingerprinter::new();
        let a = BatchId::new(
            BatchKwargs::new()
                .with("timestamp", "2020-01-01T00:00:00Z")
                .with("query_id", "q1")
                .with("partition_id", "p"),
        )
        .unwrap();
        let b = BatchId::new(
            BatchKwargs::new()
                .with("timestamp", "2020-01-02T00:00:00Z")
                .with("query_id", "q1")
                .with("partition_id", "p"),
        )
        .unwrap();
        assert_ne!(
            a.fingerprint(&fp).unwrap().content_hash(),
            b.fingerprint(&fp).unwrap().content_hash()
        );
        assert_eq!(a.to_kwargs().len(), 3);
    }
}
