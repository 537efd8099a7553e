//! Diagram extraction and rendering for the mdpane preview.
//!
//! - [`extract`]: line-oriented scanner replacing fenced diagram blocks with
//!   id-tagged placeholders
//! - [`DiagramRenderer`]: async per-block rendering, failure isolated
//! - [`KrokiRenderer`]: Mermaid to SVG through a Kroki server, with local
//!   diagram type validation and a content-hash cache
//! - [`RenderFailure`] and [`figure_html`]: markup for the two outcomes
//!
//! # Example
//!
//! ```
//! use mdpane_diagrams::{PassIds, extract, placeholder};
//!
//! let result = extract("```mermaid\ngraph TD\n  A-->B\n```\n", &mut PassIds::new());
//! assert_eq!(result.blocks.len(), 1);
//! assert_eq!(result.blocks[0].declared_kind, "graph");
//! assert!(result.text.contains(&placeholder(&result.pass, 0)));
//! ```

mod cache;
mod consts;
mod embed;
mod error;
mod extract;
mod kroki;
mod renderer;
pub mod syntax;

pub use cache::{DiagramCache, DiagramKey, MemoryCache, NullCache};
pub use consts::{DEFAULT_CACHE_ENTRIES, DEFAULT_KEYWORD, DEFAULT_TIMEOUT, UNKNOWN_KIND};
pub use embed::{RenderFailure, figure_html, replace_placeholder};
pub use error::DiagramError;
pub use extract::{
    DiagramBlock, DiagramExtractor, Extraction, PassIds, extract, placeholder,
    placeholder_container,
};
pub use kroki::KrokiRenderer;
pub use renderer::DiagramRenderer;
