use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use dqv_store::{BackendConfig, KeyKind, Store, StoreConfig, JSON_TAG};
use dqv_types::{Fingerprinter, DEFAULT_IGNORED_KEYS};
use serde::{Deserialize, Serialize};

/// Project-level configuration read from `dqv.toml`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Directory filesystem stores are rooted at. Relative paths are
    /// resolved against the directory holding the config file.
    pub root_directory: PathBuf,
    pub fingerprint: FingerprintConfig,
    pub stores: BTreeMap<String, StoreConfig>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FingerprintConfig {
    /// Kwargs keys left out of the content hash.
    pub ignored_keys: Vec<String>,
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self {
            ignored_keys: DEFAULT_IGNORED_KEYS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl Default for ProjectConfig {
    fn default() -> Self {
        let json_store = |base: &str| StoreConfig {
            serialization_type: Some(JSON_TAG.to_string()),
            key_kind: KeyKind::Text,
            backend: BackendConfig::Filesystem {
                base_directory: base.into(),
                file_extension: ".json".into(),
            },
        };
        let mut stores = BTreeMap::new();
        stores.insert("expectations".to_string(), json_store("expectations"));
        stores.insert("validations".to_string(), json_store("uncommitted/validations"));
        Self {
            root_directory: PathBuf::from("."),
            fingerprint: FingerprintConfig::default(),
            stores,
        }
    }
}

impl ProjectConfig {
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).context("invalid project configuration")
    }

    /// Load the config at `path`, falling back to defaults when the file does
    /// not exist. The root directory is resolved against the file's directory.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            Self::from_toml_str(&text).with_context(|| format!("parsing {}", path.display()))?
        } else {
            tracing::debug!(path = %path.display(), "no project config, using defaults");
            Self::default()
        };
        if config.root_directory.is_relative() {
            let base = path.parent().unwrap_or(Path::new(""));
            config.root_directory = base.join(&config.root_directory);
        }
        Ok(config)
    }

    pub fn fingerprinter(&self) -> Fingerprinter {
        Fingerprinter::new().with_ignored_keys(self.fingerprint.ignored_keys.iter().cloned())
    }

    /// Open the store configured under `name`.
    pub fn store(&self, name: &str) -> anyhow::Result<Store> {
        let store_config = self.stores.get(name).with_context(|| {
            let known: Vec<&str> = self.stores.keys().map(String::as_str).collect();
            format!("no store named {name:?} (configured: {})", known.join(", "))
        })?;
        Store::from_config(store_config, &self.root_directory)
            .with_context(|| format!("opening store {name:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config() {
        let c = ProjectConfig::default();
        assert_eq!(c.root_directory, PathBuf::from("."));
        assert_eq!(c.fingerprint.ignored_keys, vec!["data_asset_type"]);
        assert!(c.stores.contains_key("expectations"));
        assert!(c.stores.contains_key("validations"));
    }

    #[test]
    fn parse_partial_config() {
        let c = ProjectConfig::from_toml_str(
            r#"
            root_directory = "great_expectations"

            [fingerprint]
            ignored_keys = ["data_asset_type", "limit"]

            [stores.cache]
            [stores.cache.backend]
            class_name = "InMemoryStore"
            "#,
        )
        .unwrap();
        assert_eq!(c.root_directory, PathBuf::from("great_expectations"));
        assert_eq!(c.fingerprint.ignored_keys.len(), 2);
        assert_eq!(c.stores.len(), 1);
        assert_eq!(c.stores["cache"], StoreConfig::default());
    }

    #[test]
    fn load_missing_file_uses_defaults_next_to_it() {
        let dir = TempDir::new().unwrap();
        let c = ProjectConfig::load(&dir.path().join("dqv.toml")).unwrap();
        assert_eq!(c.root_directory, dir.path().join("."));
        assert_eq!(c.stores.len(), 2);
    }

    #[test]
    fn load_resolves_relative_root() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dqv.toml");
        std::fs::write(&path, "root_directory = \"project\"\n").unwrap();
        let c = ProjectConfig::load(&path).unwrap();
        assert_eq!(c.root_directory, dir.path().join("project"));
    }

    #[test]
    fn load_rejects_malformed_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dqv.toml");
        std::fs::write(&path, "stores = 3\n").unwrap();
        assert!(ProjectConfig::load(&path).is_err());
    }

    #[test]
    fn open_configured_store() {
        let dir = TempDir::new().unwrap();
        let c = ProjectConfig::load(&dir.path().join("dqv.toml")).unwrap();
        let store = c.store("expectations").unwrap();
        store.set("orders", &serde_json::json!({"expectations": []}), None).unwrap();
        assert!(dir.path().join("expectations/orders.json").is_file());
        assert!(c.store("missing").is_err());
    }

    #[test]
    fn fingerprinter_uses_configured_ignored_keys() {
        let c = ProjectConfig {
            fingerprint: FingerprintConfig {
                ignored_keys: vec!["limit".into()],
            },
            ..ProjectConfig::default()
        };
        let kwargs = dqv_types::BatchKwargs::new()
            .with("table", "orders")
            .with("limit", 5u64)
            .with("partition_id", "p");
        let fp = c.fingerprinter().fingerprint(&kwargs).unwrap();
        assert_eq!(fp.content_hash(), "table:orders");
    }
}
