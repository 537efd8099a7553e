//! Storage trait and error types.
//!
//! [`Storage`] moves whole documents as bytes. Decoding and encoding text is
//! the session's job, so backends never see UTF-8 errors.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// What went wrong, independent of the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum StorageErrorKind {
    /// Nothing exists at the path.
    NotFound,
    /// The backend refused access.
    PermissionDenied,
    /// The path exists but does not hold a document (a directory, a bad name).
    InvalidData,
    Other,
}

impl StorageErrorKind {
    fn label(self) -> &'static str {
        match self {
            Self::NotFound => "Not found",
            Self::PermissionDenied => "Permission denied",
            Self::InvalidData => "Invalid data",
            Self::Other => "Error",
        }
    }
}

impl From<io::ErrorKind> for StorageErrorKind {
    fn from(kind: io::ErrorKind) -> Self {
        match kind {
            io::ErrorKind::NotFound => Self::NotFound,
            io::ErrorKind::PermissionDenied | io::ErrorKind::ReadOnlyFilesystem => {
                Self::PermissionDenied
            }
            io::ErrorKind::IsADirectory
            | io::ErrorKind::InvalidInput
            | io::ErrorKind::InvalidData
            | io::ErrorKind::InvalidFilename => Self::InvalidData,
            _ => Self::Other,
        }
    }
}

/// Error returned by [`Storage`] operations.
///
/// Displays as `[Backend] Kind: source (path: ...)`, omitting absent parts.
#[derive(Debug)]
pub struct StorageError {
    pub kind: StorageErrorKind,
    /// Document the operation was about.
    pub path: Option<PathBuf>,
    /// Backend name, e.g. `"Fs"`.
    pub backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StorageError {
    #[must_use]
    pub fn new(kind: StorageErrorKind) -> Self {
        Self {
            kind,
            path: None,
            backend: None,
            source: None,
        }
    }

    /// Nothing exists at `path`.
    #[must_use]
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::new(StorageErrorKind::NotFound).with_path(path)
    }

    /// Classify an I/O failure on `path`.
    #[must_use]
    pub fn io(err: io::Error, path: impl Into<PathBuf>) -> Self {
        Self::new(err.kind().into())
            .with_path(path)
            .with_source(err)
    }

    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Whether the document does not exist.
    ///
    /// Restoring the last file treats this case as "forget it" rather than
    /// as a failure.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind == StorageErrorKind::NotFound
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }
        f.write_str(self.kind.label())?;
        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }
        Ok(())
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|s| s as &(dyn std::error::Error + 'static))
    }
}

/// Byte-level access to the document backing store.
///
/// The session reads a whole document on open and writes the whole buffer
/// back on save. Calls happen on blocking worker threads, hence `Send + Sync`.
pub trait Storage: Send + Sync {
    /// Read the full content at `path`.
    ///
    /// # Errors
    ///
    /// [`StorageErrorKind::NotFound`] if nothing exists at `path`, another
    /// kind if the read fails.
    fn read(&self, path: &Path) -> Result<Vec<u8>, StorageError>;

    /// Replace the content at `path` with `bytes`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the write fails.
    fn write(&self, path: &Path, bytes: &[u8]) -> Result<(), StorageError>;

    /// Whether a document exists at `path`. Errors count as "no".
    fn exists(&self, path: &Path) -> bool;
}
