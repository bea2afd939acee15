//! Serializing key-value stores for dqv.
//!
//! Expectation suites, validation results and project configuration are all
//! persisted through a [`Store`]: a small façade that checks keys, converts
//! values to text with a named serializer, and hands raw reads and writes to
//! a [`StoreBackend`].
//!
//! # Storage Backends
//!
//! - [`InMemoryBackend`] -- `HashMap`-based backend for tests and caching
//! - [`FilesystemBackend`] -- one plain-text file per key under a base directory
//!
//! # Design Rules
//!
//! 1. Keys are validated before any backend call; a store accepts one [`KeyKind`].
//! 2. Serialization resolves per call: override, then store default, then `none`.
//! 3. Unknown serialization tags are errors, never silent passthrough.
//! 4. Writes overwrite without any concurrency check; the last writer wins.
//! 5. Backends never interpret the text they hold.
//! 6. All I/O errors are propagated, never silently ignored.

pub mod config;
pub mod error;
pub mod filesystem;
pub mod key;
pub mod memory;
pub mod serialization;
pub mod store;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use config::{BackendConfig, StoreConfig};
pub use error::{StoreError, StoreResult};
pub use filesystem::{ensure_dir, FilesystemBackend};
pub use key::{KeyKind, KeyValidator, ResourceIdentifier, StoreKey};
pub use memory::InMemoryBackend;
pub use serialization::{SerializationRegistry, Serializer, JSON_TAG, NONE_TAG};
pub use store::Store;
pub use traits::StoreBackend;
