//! Batch identity types for the dqv data-quality framework.
//!
//! A datasource is asked for a batch of tabular data by handing it a set of
//! *batch kwargs*: the file path, table name, query or in-memory frame that
//! identifies the data. This crate models those kwargs, the per-datasource
//! policies that decide whether a set of kwargs is well formed, and the
//! fingerprinting scheme that reduces kwargs to a stable identifier.
//!
//! # Key Types
//!
//! - [`BatchKwargs`]: the generic, mutable kwargs mapping
//! - [`TypedBatchKwargs`]: kwargs checked against a [`BatchKwargsKind`] policy
//! - [`BatchId`]: kwargs describing the output of a fetch; always timestamped
//! - [`BatchFingerprint`]: `(partition_id, content_hash)` identity of a batch
//! - [`Fingerprinter`]: derives fingerprints from kwargs
//! - [`FrameHandle`]: reference to an in-memory frame owned by the host
//! - [`PartitionObject`]: `{partition, weights}` record from the statistics layer

pub mod batch_id;
pub mod error;
pub mod fingerprint;
pub mod frame;
pub mod kwargs;
pub mod partition;
pub mod policy;

pub use batch_id::BatchId;
pub use error::{BatchError, BatchResult};
pub use fingerprint::{
    format_partition_timestamp, is_partition_timestamp, BatchFingerprint, Fingerprinter,
    DEFAULT_IGNORED_KEYS, PARTITION_ID_KEY,
};
pub use frame::{FrameHandle, FrameKind};
pub use kwargs::{BatchKwargs, BatchValue, FRAME_TAG};
pub use partition::PartitionObject;
pub use policy::{BatchKwargsKind, DatasourceFamily, TypedBatchKwargs};
