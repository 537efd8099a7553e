//! Filesystem storage implementation.
//!
//! Provides [`FsStorage`] for reading and writing documents on the local
//! filesystem.

use std::fs;
use std::path::Path;

use crate::storage::{Storage, StorageError};

/// Backend identifier for error messages.
const BACKEND: &str = "Fs";

/// Documents on the local filesystem.
///
/// Relative paths resolve against the process working directory.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsStorage;

impl FsStorage {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Storage for FsStorage {
    fn read(&self, path: &Path) -> Result<Vec<u8>, StorageError> {
        let bytes =
            fs::read(path).map_err(|e| StorageError::io(e, path).with_backend(BACKEND))?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "Read document");
        Ok(bytes)
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
        fs::write(path, bytes).map_err(|e| StorageError::io(e, path).with_backend(BACKEND))?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "Wrote document");
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StorageErrorKind;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_read_existing_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("guide.md"), "# Guide\n").unwrap();

        let bytes = FsStorage::new().read(&tmp.path().join("guide.md")).unwrap();

        assert_eq!(bytes, b"# Guide\n");
    }

    #[test]
    fn test_read_missing_file_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = FsStorage::new()
            .read(&tmp.path().join("missing.md"))
            .unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(err.backend, Some("Fs"));
        assert_eq!(err.path, Some(tmp.path().join("missing.md")));
    }

    #[test]
    fn test_write_then_read() {
        let tmp = TempDir::new().unwrap();
        FsStorage::new()
            .write(&tmp.path().join("draft.md"), b"# Draft")
            .unwrap();

        assert_eq!(
            fs::read_to_string(tmp.path().join("draft.md")).unwrap(),
            "# Draft"
        );
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let tmp = TempDir::new().unwrap();
        let err = FsStorage::new()
            .write(&tmp.path().join("gone/draft.md"), b"# Draft")
            .unwrap_err();

        assert_eq!(err.kind, StorageErrorKind::NotFound);
    }

    #[test]
    fn test_exists() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.md"), "").unwrap();
        fs::create_dir(tmp.path().join("dir")).unwrap();

        let storage = FsStorage::new();

        assert!(storage.exists(&tmp.path().join("a.md")));
        assert!(!storage.exists(&tmp.path().join("b.md")));
        assert!(!storage.exists(&tmp.path().join("dir")));
    }
}
