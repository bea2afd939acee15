use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};
use crate::key::KeyKind;

/// Which backend a store uses, tagged by `class_name`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "class_name")]
pub enum BackendConfig {
    #[serde(rename = "InMemoryStore")]
    InMemory,
    #[serde(rename = "FilesystemStore")]
    Filesystem {
        /// Directory under the project root holding the store's files.
        base_directory: PathBuf,
        /// Appended to every key to form a file name, e.g. `.json`.
        #[serde(default)]
        file_extension: String,
    },
}

impl BackendConfig {
    pub fn class_name(&self) -> &'static str {
        match self {
            Self::InMemory => "InMemoryStore",
            Self::Filesystem { .. } => "FilesystemStore",
        }
    }
}

/// Configuration for one store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Default serialization tag; `none` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serialization_type: Option<String>,
    #[serde(default)]
    pub key_kind: KeyKind,
    pub backend: BackendConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::InMemory,
            serialization_type: None,
            key_kind: KeyKind::Text,
        }
    }
}

impl StoreConfig {
    pub fn from_toml_str(s: &str) -> StoreResult<Self> {
        toml::from_str(s).map_err(|e| StoreError::Config(e.to_string()))
    }

    pub fn to_toml_string(&self) -> StoreResult<String> {
        toml::to_string(self).map_err(|e| StoreError::Config(e.to_string()))
    }
}
