use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::traits::StoreBackend;

#[derive(Default)]
struct Entries {
    values: HashMap<String, String>,
    order: Vec<String>,
}

/// In-memory, HashMap-based backend.
///
/// Values live as long as the backend. Keys are listed in first-insertion
/// order; overwriting a key keeps its position.
pub struct InMemoryBackend {
    entries: RwLock<Entries>,
}

impl InMemoryBackend {
    /// Create a new empty backend.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Entries::default()),
        }
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.order.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove all values.
    pub fn clear(&self) -> StoreResult<()> {
        let mut entries = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        entries.values.clear();
        entries.order.clear();
        Ok(())
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreBackend for InMemoryBackend {
    fn get(&self, key: &str) -> StoreResult<String> {
        let entries = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
        entries
            .values
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut entries = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        if entries
            .values
            .insert(key.to_string(), value.to_string())
            .is_none()
        {
            entries.order.push(key.to_string());
        }
        Ok(())
    }

    fn list_keys(&self) -> StoreResult<Vec<String>> {
        let entries = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(entries.order.clone())
    }

    fn has_key(&self, key: &str) -> StoreResult<bool> {
        let entries = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(entries.values.contains_key(key))
    }
}

impl std::fmt::Debug for InMemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBackend")
            .field("key_count", &self.len())
            .finish()
    }
}
