use crate::error::StoreResult;

/// Durable medium holding raw text values under string keys.
///
/// Backends never interpret values; serialization and key-kind checks happen
/// in [`Store`](crate::Store) before a backend is called.
pub trait StoreBackend: Send + Sync {
    /// Read the raw value stored under `key`.
    ///
    /// Returns [`StoreError::NotFound`](crate::StoreError::NotFound) if no
    /// value is stored.
    fn get(&self, key: &str) -> StoreResult<String>;

    /// Store `value` under `key`, replacing any existing value.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// All keys currently stored, in backend order.
    fn list_keys(&self) -> StoreResult<Vec<String>>;

    /// Whether a value is stored under `key`.
    ///
    /// The default scans [`list_keys`](Self::list_keys); backends with a
    /// direct lookup should override it.
    fn has_key(&self, key: &str) -> StoreResult<bool> {
        Ok(self.list_keys()?.iter().any(|k| k == key))
    }

    /// Reject keys this backend cannot store. Accepts everything by default.
    fn validate_key(&self, _key: &str) -> StoreResult<()> {
        Ok(())
    }
}

impl<B: StoreBackend + ?Sized> StoreBackend for Box<B> {
    fn get(&self, key: &str) -> StoreResult<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set(key, value)
    }

    fn list_keys(&self) -> StoreResult<Vec<String>> {
        (**self).list_keys()
    }

    fn has_key(&self, key: &str) -> StoreResult<bool> {
        (**self).has_key(key)
    }

    fn validate_key(&self, key: &str) -> StoreResult<()> {
        (**self).validate_key(key)
    }
}
