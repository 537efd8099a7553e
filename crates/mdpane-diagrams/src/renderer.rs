//! Diagram renderer abstraction.

use async_trait::async_trait;

use crate::error::DiagramError;
use crate::extract::DiagramBlock;

/// Turns one diagram block into embeddable markup.
///
/// Calls are independent: the compositor runs every block of a pass
/// concurrently and in no particular order, and a failure affects only the
/// block that produced it.
#[async_trait]
pub trait DiagramRenderer: Send + Sync {
    /// Render `block` to an HTML fragment (typically an inline SVG).
    async fn render(&self, block: &DiagramBlock) -> Result<String, DiagramError>;
}
