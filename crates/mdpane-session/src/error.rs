//! Session error types.

use std::path::PathBuf;

use mdpane_storage::StorageError;

/// Errors returned by session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The operation needs a loaded document.
    #[error("No document is open")]
    NoDocument,
    /// Reading or writing the backing file failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// The file is not valid UTF-8 text.
    #[error("{} is not valid UTF-8: {source}", path.display())]
    InvalidUtf8 {
        /// File that failed to decode.
        path: PathBuf,
        /// Decoder error.
        source: std::string::FromUtf8Error,
    },
    /// A background I/O task panicked or was cancelled.
    #[error("Background task failed: {0}")]
    Task(String),
}

impl SessionError {
    /// Whether the error means the file does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Storage(e) if e.is_not_found())
    }
}
