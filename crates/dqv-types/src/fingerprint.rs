//! Batch fingerprinting.
//!
//! A fingerprint reduces batch kwargs to a `(partition_id, content_hash)`
//! pair. The content hash only covers the *identifying* fields: everything
//! except the partition id and a configurable set of ignored keys. Batches
//! that differ only in ignored fields therefore share a content hash.
//!
//! When exactly one identifying field remains the hash is skipped and the
//! field is rendered as `key:value`, which keeps simple batches readable.
//! Otherwise the identifying fields are serialized as canonical JSON (keys
//! sorted, no whitespace) and digested with domain-separated BLAKE3.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::{BatchError, BatchResult};
use crate::kwargs::{BatchKwargs, BatchValue};

/// Key holding an explicit partition id.
pub const PARTITION_ID_KEY: &str = "partition_id";

/// Keys ignored by a default [`Fingerprinter`].
pub const DEFAULT_IGNORED_KEYS: &[&str] = &["data_asset_type"];

const PARTITION_TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S%.6fZ";
const FINGERPRINT_DOMAIN: &str = "dqv-batch-fingerprint-v1";

/// Identity of a batch for caching and deduplication.
///
/// Ordering and hashing follow the tuple `(partition_id, content_hash)`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BatchFingerprint {
    partition_id: String,
    content_hash: String,
}

impl BatchFingerprint {
    pub fn new(partition_id: impl Into<String>, content_hash: impl Into<String>) -> Self {
        Self {
            partition_id: partition_id.into(),
            content_hash: content_hash.into(),
        }
    }

    pub fn partition_id(&self) -> &str {
        &self.partition_id
    }

    pub fn content_hash(&self) -> &str {
        &self.content_hash
    }

    pub fn to_tuple(&self) -> (&str, &str) {
        (&self.partition_id, &self.content_hash)
    }
}

impl fmt::Display for BatchFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.partition_id, self.content_hash)
    }
}

type Clock = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Derives [`BatchFingerprint`]s from batch kwargs.
pub struct Fingerprinter {
    ignored_keys: BTreeSet<String>,
    clock: Clock,
}

impl Fingerprinter {
    /// A fingerprinter ignoring [`DEFAULT_IGNORED_KEYS`] and using the
    /// system clock for generated partition ids.
    pub fn new() -> Self {
        Self {
            ignored_keys: DEFAULT_IGNORED_KEYS.iter().map(|k| k.to_string()).collect(),
            clock: Box::new(Utc::now),
        }
    }

    /// Replace the ignored key set.
    pub fn with_ignored_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the clock used when kwargs carry no partition id.
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> DateTime<Utc> + Send + Sync + 'static,
    {
        self.clock = Box::new(clock);
        self
    }

    pub fn ignored_keys(&self) -> impl Iterator<Item = &str> {
        self.ignored_keys.iter().map(String::as_str)
    }

    /// Fingerprint a kwargs mapping.
    pub fn fingerprint(&self, kwargs: &BatchKwargs) -> BatchResult<BatchFingerprint> {
        let partition_id = match kwargs.get(PARTITION_ID_KEY) {
            None | Some(BatchValue::Json(Value::Null)) => {
                format_partition_timestamp(&(self.clock)())
            }
            Some(value) => value.to_string(),
        };

        let id_fields: BTreeMap<&str, &BatchValue> = kwargs
            .iter()
            .filter(|(k, _)| *k != PARTITION_ID_KEY && !self.ignored_keys.contains(*k))
            .collect();

        let content_hash = match id_fields.iter().next() {
            Some((key, value)) if id_fields.len() == 1 => format!("{key}:{value}"),
            _ => {
                let canonical: BTreeMap<&str, Value> = id_fields
                    .iter()
                    .map(|(k, v)| (*k, v.to_canonical_json()))
                    .collect();
                let canonical = serde_json::to_vec(&canonical)
                    .map_err(|e| BatchError::Serialization(e.to_string()))?;
                let mut hasher = blake3::Hasher::new();
                hasher.update(FINGERPRINT_DOMAIN.as_bytes());
                hasher.update(b":");
                hasher.update(&canonical);
                hasher.finalize().to_hex().to_string()
            }
        };

        Ok(BatchFingerprint {
            partition_id,
            content_hash,
        })
    }

    /// Fingerprint an arbitrary JSON value, if it is usable as batch kwargs.
    ///
    /// Fingerprints are advisory, so failures are logged and reported as
    /// `None` instead of being returned as errors.
    pub fn build_fingerprint(&self, value: Value) -> Option<BatchFingerprint> {
        let result = BatchKwargs::from_value(value).and_then(|kwargs| self.fingerprint(&kwargs));
        match result {
            Ok(fingerprint) => Some(fingerprint),
            Err(e) => {
                warn!(error = %e, "unable to build batch fingerprint from provided value");
                None
            }
        }
    }
}

impl Default for Fingerprinter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Fingerprinter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fingerprinter")
            .field("ignored_keys", &self.ignored_keys)
            .finish_non_exhaustive()
    }
}

/// Render a time as a partition id: `YYYYMMDDThhmmss.ffffffZ`.
pub fn format_partition_timestamp(time: &DateTime<Utc>) -> String {
    time.format(PARTITION_TIMESTAMP_FORMAT).to_string()
}

/// Whether `s` is a partition id produced by [`format_partition_timestamp`].
pub fn is_partition_timestamp(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() != 23 || bytes[8] != b'T' || bytes[15] != b'.' || bytes[22] != b'Z' {
        return false;
    }
    let digits_ok = bytes[..8]
        .iter()
        .chain(&bytes[9..15])
        .chain(&bytes[16..22])
        .all(u8::is_ascii_digit);
    if !digits_ok {
        return false;
    }
    let field = |range: std::ops::Range<usize>| s[range].parse::<u32>().unwrap_or(u32::MAX);
    let date = i32::try_from(field(0..4))
        .ok()
        .and_then(|year| NaiveDate::from_ymd_opt(year, field(4..6), field(6..8)));
    let time = NaiveTime::from_hms_opt(field(9..11), field(11..13), field(13..15));
    date.is_some() && time.is_some()
}
