//! CLI error types.

use mdpane_config::ConfigError;
use mdpane_session::SessionError;
use mdpane_storage::StorageError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Session(#[from] SessionError),

    #[error("{0}")]
    Storage(#[from] StorageError),

    #[error("{0}")]
    Validation(String),
}
