use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::{BackendConfig, StoreConfig};
use crate::error::{StoreError, StoreResult};
use crate::filesystem::FilesystemBackend;
use crate::key::{KeyKind, KeyValidator, StoreKey};
use crate::memory::InMemoryBackend;
use crate::serialization::{SerializationRegistry, Serializer, JSON_TAG};
use crate::traits::StoreBackend;

/// A serializing key-value store over a single backend.
///
/// Every operation validates the key against the store's [`KeyKind`] before
/// the backend is touched. Values are encoded with the serializer named by
/// the per-call override, else the store default, else `none`.
pub struct Store<B = Box<dyn StoreBackend>> {
    backend: B,
    validator: KeyValidator,
    serialization_type: Option<String>,
    registry: SerializationRegistry,
}

impl<B: StoreBackend> Store<B> {
    /// A text-keyed store with no default serialization.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            validator: KeyValidator::default(),
            serialization_type: None,
            registry: SerializationRegistry::new(),
        }
    }

    /// Set the default serialization tag. Fails if the tag is not registered.
    pub fn with_serialization_type(mut self, tag: impl Into<String>) -> StoreResult<Self> {
        let tag = tag.into();
        self.registry.serializer_for(&tag)?;
        self.serialization_type = Some(tag);
        Ok(self)
    }

    pub fn with_key_kind(mut self, kind: KeyKind) -> Self {
        self.validator = KeyValidator::new(kind);
        self
    }

    /// Replace the serialization registry.
    pub fn with_registry(mut self, registry: SerializationRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn serialization_type(&self) -> Option<&str> {
        self.serialization_type.as_deref()
    }

    pub fn key_kind(&self) -> KeyKind {
        self.validator.expected()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Read and decode the value stored under `key`.
    pub fn get(
        &self,
        key: impl Into<StoreKey>,
        serialization_type: Option<&str>,
    ) -> StoreResult<Value> {
        let raw_key = self.backend_key(&key.into())?;
        let serializer = self.serializer(serialization_type)?;
        let raw = self.backend.get(&raw_key)?;
        (serializer.decode)(&raw)
    }

    /// Encode `value` and store it under `key`, replacing any existing value.
    pub fn set(
        &self,
        key: impl Into<StoreKey>,
        value: &Value,
        serialization_type: Option<&str>,
    ) -> StoreResult<()> {
        let raw_key = self.backend_key(&key.into())?;
        let serializer = self.serializer(serialization_type)?;
        let raw = (serializer.encode)(value)?;
        debug!(key = %raw_key, "setting store value");
        self.backend.set(&raw_key, &raw)
    }

    /// All stored keys, as keys of the store's kind.
    pub fn list_keys(&self) -> StoreResult<Vec<StoreKey>> {
        self.backend
            .list_keys()?
            .into_iter()
            .map(|raw| self.validator.decode(raw))
            .collect()
    }

    pub fn has_key(&self, key: impl Into<StoreKey>) -> StoreResult<bool> {
        let raw_key = self.backend_key(&key.into())?;
        self.backend.has_key(&raw_key)
    }

    /// Read a JSON-serialized value and deserialize it into `T`.
    pub fn get_typed<T: DeserializeOwned>(&self, key: impl Into<StoreKey>) -> StoreResult<T> {
        let value = self.get(key, Some(JSON_TAG))?;
        serde_json::from_value(value).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Serialize `value` and store it as JSON.
    pub fn set_typed<T: Serialize>(&self, key: impl Into<StoreKey>, value: &T) -> StoreResult<()> {
        let value =
            serde_json::to_value(value).map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.set(key, &value, Some(JSON_TAG))
    }

    fn backend_key(&self, key: &StoreKey) -> StoreResult<String> {
        let raw = self.validator.encode(key)?;
        self.backend.validate_key(&raw)?;
        Ok(raw)
    }

    fn serializer(&self, call: Option<&str>) -> StoreResult<Serializer> {
        self.registry.resolve(call, self.serialization_type.as_deref())
    }
}

impl Store {
    /// Build a store from configuration. Filesystem backends are rooted at
    /// `root_directory`.
    pub fn from_config(config: &StoreConfig, root_directory: &Path) -> StoreResult<Self> {
        let backend: Box<dyn StoreBackend> = match &config.backend {
            BackendConfig::InMemory => Box::new(InMemoryBackend::new()),
            BackendConfig::Filesystem {
                base_directory,
                file_extension,
            } => Box::new(FilesystemBackend::new(
                root_directory,
                base_directory,
                file_extension.clone(),
            )?),
        };
        info!(backend = config.backend.class_name(), key_kind = %config.key_kind, "opened store");
        let store = Store::new(backend).with_key_kind(config.key_kind);
        match &config.serialization_type {
            Some(tag) => store.with_serialization_type(tag.clone()),
            None => Ok(store),
        }
    }
}

impl<B> std::fmt::Debug for Store<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("key_kind", &self.validator.expected())
            .field("serialization_type", &self.serialization_type)
            .finish_non_exhaustive()
    }
}
