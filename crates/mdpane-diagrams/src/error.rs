//! Diagram rendering errors.

/// Failure to render a single diagram block.
///
/// Each variant stays local to its block: the preview shows an inline error
/// region and every other block renders normally.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiagramError {
    /// Body does not start with a recognised diagram type.
    #[error("No diagram type detected matching given configuration for text: {kind}")]
    UnknownKind {
        /// The first token of the block body.
        kind: String,
    },
    /// No Kroki server is configured.
    #[error("Diagram rendering is disabled (no Kroki URL configured)")]
    Disabled,
    /// Transport failure or error status from the server.
    #[error("HTTP error: {0}")]
    Http(String),
    /// Reading the response failed.
    #[error("I/O error: {0}")]
    Io(String),
    /// The render task panicked or was cancelled.
    #[error("Render task failed: {0}")]
    Task(String),
}
