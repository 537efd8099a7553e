//! Internal constants for diagram extraction and rendering.

use std::time::Duration;

/// Fence keyword that marks a diagram block unless configured otherwise.
pub const DEFAULT_KEYWORD: &str = "mermaid";

/// Declared kind of a block whose body is empty.
pub const UNKNOWN_KIND: &str = "unknown";

/// Default HTTP timeout for Kroki requests (30 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Rendered diagrams kept in memory before the oldest is evicted.
pub const DEFAULT_CACHE_ENTRIES: usize = 256;

/// Kroki endpoint for Mermaid diagrams.
pub(crate) const MERMAID_ENDPOINT: &str = "mermaid";

/// Output format requested from Kroki.
pub(crate) const SVG_FORMAT: &str = "svg";
