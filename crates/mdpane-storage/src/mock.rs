//! Mock storage implementation for testing.
//!
//! Provides [`MockStorage`] for unit testing without filesystem access.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::storage::{Storage, StorageError, StorageErrorKind};

/// Backend identifier for error messages.
const BACKEND: &str = "Mock";

/// Mock storage for testing.
///
/// Stores file content in memory and records every successful write. Use the
/// builder methods to seed content, and [`fail_writes`](Self::fail_writes)
/// to simulate a backing store that rejects writes.
///
/// # Example
///
/// ```ignore
/// use std::path::Path;
/// use mdpane_storage::{MockStorage, Storage};
///
/// let storage = MockStorage::new().with_file("guide.md", "# User Guide");
///
/// let bytes = storage.read(Path::new("guide.md")).unwrap();
/// storage.write(Path::new("guide.md"), b"# Changed").unwrap();
/// assert_eq!(storage.writes().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockStorage {
    files: RwLock<HashMap<PathBuf, Vec<u8>>>,
    writes: RwLock<Vec<(PathBuf, Vec<u8>)>>,
    write_attempts: RwLock<usize>,
    fail_writes: RwLock<bool>,
}

impl MockStorage {
    /// Create a new empty mock storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file with the given content.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_file(self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.files
            .write()
            .unwrap()
            .insert(path.into(), content.into().into_bytes());
        self
    }

    /// Make subsequent writes fail (`true`) or succeed (`false`).
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn fail_writes(&self, fail: bool) {
        *self.fail_writes.write().unwrap() = fail;
    }

    /// Remove a file, as if it had been deleted behind the session's back.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn remove(&self, path: &Path) {
        self.files.write().unwrap().remove(path);
    }

    /// Successful writes in the order they happened.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn writes(&self) -> Vec<(PathBuf, Vec<u8>)> {
        self.writes.read().unwrap().clone()
    }

    /// Number of write calls, including failed ones.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn write_attempts(&self) -> usize {
        *self.write_attempts.read().unwrap()
    }

    /// Current content at `path` as UTF-8, if any.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn content(&self, path: &Path) -> Option<String> {
        self.files
            .read()
            .unwrap()
            .get(path)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}

impl Storage for MockStorage {
    fn read(&self, path: &Path) -> Result<Vec<u8>, StorageError> {
        self.files
            .read()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::not_found(path).with_backend(BACKEND))
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
        *self.write_attempts.write().unwrap() += 1;

        if *self.fail_writes.read().unwrap() {
            let source = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
            return Err(StorageError::new(StorageErrorKind::PermissionDenied)
                .with_path(path)
                .with_backend(BACKEND)
                .with_source(source));
        }

        self.files
            .write()
            .unwrap()
            .insert(path.to_path_buf(), bytes.to_vec());
        self.writes
            .write()
            .unwrap()
            .push((path.to_path_buf(), bytes.to_vec()));
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.read().unwrap().contains_key(path)
    }
}
