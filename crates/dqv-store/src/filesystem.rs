//! Filesystem backend.
//!
//! Each key is one plain-text file at
//! `<root_directory>/<base_directory>/<key><file_extension>`. The `/` in a
//! key nests the file in subdirectories, which are created on demand. File
//! content is exactly the stored value: no framing, no checksum.
//!
//! There is no locking. Concurrent writers to the same key race and the last
//! write wins.

use std::fs;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{StoreError, StoreResult};
use crate::traits::StoreBackend;

/// Backend storing each value as a file under a base directory.
#[derive(Debug)]
pub struct FilesystemBackend {
    root_directory: PathBuf,
    full_base_directory: PathBuf,
    file_extension: String,
}

impl FilesystemBackend {
    /// Open a backend, creating `root_directory` if it does not exist.
    pub fn new(
        root_directory: impl Into<PathBuf>,
        base_directory: impl AsRef<Path>,
        file_extension: impl Into<String>,
    ) -> StoreResult<Self> {
        let root_directory = root_directory.into();
        let full_base_directory = root_directory.join(base_directory);
        ensure_dir(&root_directory)?;
        Ok(Self {
            root_directory,
            full_base_directory,
            file_extension: file_extension.into(),
        })
    }

    pub fn root_directory(&self) -> &Path {
        &self.root_directory
    }

    /// `root_directory` joined with the configured base directory.
    pub fn full_base_directory(&self) -> &Path {
        &self.full_base_directory
    }

    pub fn file_extension(&self) -> &str {
        &self.file_extension
    }

    /// Path of the file holding `key`.
    pub fn key_to_path(&self, key: &str) -> PathBuf {
        self.full_base_directory
            .join(format!("{key}{}", self.file_extension))
    }

    /// Key stored in the file at `path`.
    ///
    /// Returns `None` for paths outside the base directory, paths that are
    /// not valid UTF-8, and files without the configured extension.
    pub fn path_to_key(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.full_base_directory).ok()?;
        let parts = relative
            .components()
            .map(|c| match c {
                Component::Normal(part) => part.to_str(),
                _ => None,
            })
            .collect::<Option<Vec<&str>>>()?;
        let joined = parts.join("/");
        let key = joined.strip_suffix(self.file_extension.as_str())?;
        if key.is_empty() {
            return None;
        }
        Some(key.to_string())
    }
}

impl StoreBackend for FilesystemBackend {
    fn get(&self, key: &str) -> StoreResult<String> {
        self.validate_key(key)?;
        let path = self.key_to_path(key);
        debug!(key, path = %path.display(), "reading store file");
        // A directory here only holds nested keys; the key itself is unset.
        if path.is_dir() {
            return Err(StoreError::NotFound(key.to_string()));
        }
        fs::read_to_string(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => StoreError::NotFound(key.to_string()),
            _ => StoreError::Io(e),
        })
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.validate_key(key)?;
        let path = self.key_to_path(key);
        if let Some(parent) = path.parent() {
            ensure_dir(parent)?;
        }
        debug!(key, path = %path.display(), bytes = value.len(), "writing store file");
        fs::write(&path, value)?;
        Ok(())
    }

    fn list_keys(&self) -> StoreResult<Vec<String>> {
        if !self.full_base_directory.exists() {
            return Ok(Vec::new());
        }
        let mut keys = Vec::new();
        for entry in WalkDir::new(&self.full_base_directory).sort_by_file_name() {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            match self.path_to_key(entry.path()) {
                Some(key) => keys.push(key),
                None => debug!(path = %entry.path().display(), "skipping file without store key"),
            }
        }
        Ok(keys)
    }

    /// Rejects keys that would escape or alias the base directory.
    fn validate_key(&self, key: &str) -> StoreResult<()> {
        let invalid = |reason: &str| StoreError::InvalidKey {
            key: key.to_string(),
            reason: reason.to_string(),
        };
        if key.is_empty() {
            return Err(invalid("key must not be empty"));
        }
        if key.contains('\\') || key.contains('\0') {
            return Err(invalid("key must not contain '\\' or NUL"));
        }
        if key.starts_with('/') || key.ends_with('/') {
            return Err(invalid("key must not start or end with '/'"));
        }
        for part in key.split('/') {
            if part.is_empty() || part == "." || part == ".." {
                return Err(invalid("key components must be non-empty and not '.' or '..'"));
            }
        }
        Ok(())
    }
}

/// Create `path` and its parents. An existing directory is not an error.
pub fn ensure_dir(path: &Path) -> StoreResult<()> {
    if path.is_dir() {
        return Ok(());
    }
    match fs::create_dir_all(path) {
        Ok(()) => {
            info!(path = %path.display(), "created store directory");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        Err(e) => Err(StoreError::Io(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn backend(ext: &str) -> (TempDir, FilesystemBackend) {
        let dir = TempDir::new().unwrap();
        let backend = FilesystemBackend::new(dir.path(), "expectations", ext).unwrap();
        (dir, backend)
    }

    // -----------------------------------------------------------------------
    // Path mapping
    // -----------------------------------------------------------------------

    #[test]
    fn key_to_path_layout() {
        let (dir, b) = backend(".json");
        assert_eq!(
            b.key_to_path("orders/warning"),
            dir.path().join("expectations").join("orders/warning.json")
        );
    }

    #[test]
    fn path_to_key_inverts_key_to_path() {
        let (_dir, b) = backend(".json");
        for key in ["a", "a/b", "deep/nested/key.v1", "x.json"] {
            assert_eq!(b.path_to_key(&b.key_to_path(key)).as_deref(), Some(key));
        }
    }

    #[test]
    fn path_to_key_without_extension() {
        let (_dir, b) = backend("");
        assert_eq!(b.path_to_key(&b.key_to_path("a/b")).as_deref(), Some("a/b"));
    }

    #[test]
    fn path_to_key_rejects_foreign_paths() {
        let (dir, b) = backend(".json");
        assert!(b.path_to_key(&dir.path().join("other/a.json")).is_none());
        assert!(b.path_to_key(&b.full_base_directory().join("a.txt")).is_none());
    }

    // -----------------------------------------------------------------------
    // Read / write
    // -----------------------------------------------------------------------

    #[test]
    fn constructor_creates_root() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("project");
        FilesystemBackend::new(&root, "uncommitted/validations", "").unwrap();
        assert!(root.is_dir());
        // Opening again over the existing root is fine.
        FilesystemBackend::new(&root, "uncommitted/validations", "").unwrap();
    }

    #[test]
    fn set_creates_parents_and_writes_raw_text() {
        let (_dir, b) = backend(".json");
        b.set("run-1/orders", "{\"success\":true}").unwrap();
        let on_disk = fs::read_to_string(b.key_to_path("run-1/orders")).unwrap();
        assert_eq!(on_disk, "{\"success\":true}");
        assert_eq!(b.get("run-1/orders").unwrap(), "{\"success\":true}");
    }

    #[test]
    fn set_overwrites() {
        let (_dir, b) = backend("");
        b.set("k", "first").unwrap();
        b.set("k", "second").unwrap();
        assert_eq!(b.get("k").unwrap(), "second");
    }

    #[test]
    fn get_missing_is_not_found() {
        let (_dir, b) = backend(".json");
        assert!(matches!(b.get("missing"), Err(StoreError::NotFound(k)) if k == "missing"));
    }

    #[test]
    fn get_namespace_prefix_is_not_found() {
        let (_dir, b) = backend("");
        b.set("a/b", "x").unwrap();
        assert!(b.key_to_path("a").is_dir());
        assert!(!b.has_key("a").unwrap());
        assert!(matches!(b.get("a"), Err(StoreError::NotFound(k)) if k == "a"));
    }

    // -----------------------------------------------------------------------
    // Listing
    // -----------------------------------------------------------------------

    #[test]
    fn fresh_backend_lists_nothing() {
        let (_dir, b) = backend(".json");
        assert!(b.list_keys().unwrap().is_empty());
        assert!(!b.has_key("a").unwrap());
    }

    #[test]
    fn list_keys_walks_subdirectories() {
        let (_dir, b) = backend(".json");
        b.set("a/b", "x").unwrap();
        b.set("c", "y").unwrap();
        b.set("a/d/e", "z").unwrap();
        let mut keys = b.list_keys().unwrap();
        keys.sort();
        assert_eq!(keys, vec!["a/b", "a/d/e", "c"]);
        assert!(b.has_key("a/b").unwrap());
        assert!(!b.has_key("a").unwrap());
    }

    #[test]
    fn list_keys_skips_files_without_extension() {
        let (_dir, b) = backend(".json");
        b.set("kept", "1").unwrap();
        fs::write(b.full_base_directory().join("README.md"), "notes").unwrap();
        assert_eq!(b.list_keys().unwrap(), vec!["kept"]);
    }

    // -----------------------------------------------------------------------
    // Key validation
    // -----------------------------------------------------------------------

    #[test]
    fn rejects_keys_that_escape_or_alias() {
        let (_dir, b) = backend("");
        for key in ["", "/abs", "trailing/", "a//b", "../up", "a/./b", "a\\b", "nul\0"] {
            assert!(
                matches!(b.validate_key(key), Err(StoreError::InvalidKey { .. })),
                "{key:?} should be rejected"
            );
            assert!(b.set(key, "v").is_err());
        }
    }

    #[test]
    fn ensure_dir_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("x/y");
        ensure_dir(&path).unwrap();
        ensure_dir(&path).unwrap();
        assert!(path.is_dir());
    }

    #[test]
    fn ensure_dir_fails_over_a_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("f");
        fs::write(&file, "").unwrap();
        assert!(ensure_dir(&file).is_err());
    }

    proptest! {
        #[test]
        fn key_path_round_trip(
            parts in proptest::collection::vec("[A-Za-z0-9_-][A-Za-z0-9_.-]{0,10}", 1..4),
        ) {
            let (_dir, b) = backend(".json");
            let key = parts.join("/");
            prop_assume!(b.validate_key(&key).is_ok());
            prop_assert_eq!(b.path_to_key(&b.key_to_path(&key)), Some(key));
        }
    }
}
