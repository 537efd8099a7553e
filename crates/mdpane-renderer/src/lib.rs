//! Markdown to HTML rendering for the mdpane preview.
//!
//! Rendering is a pure function of the input text: [`render_markdown`] runs
//! pulldown-cmark with the GitHub-flavoured extensions, and
//! [`highlight_code_blocks`] rewrites every emitted `<pre><code>` block
//! through a [`Highlighter`]. [`HtmlRenderer`] combines the two.
//!
//! # Example
//!
//! ```
//! use mdpane_renderer::HtmlRenderer;
//!
//! let html = HtmlRenderer::new().render("# Hello\n\n**Bold** text");
//! assert_eq!(html, "<h1>Hello</h1>\n<p><strong>Bold</strong> text</p>\n");
//! ```

mod escape;
mod highlight;
mod markdown;

use std::sync::Arc;

pub use escape::{escape_html, unescape_html};
pub use highlight::{DEFAULT_THEME, Highlighter, SyntectHighlighter, highlight_code_blocks};
pub use markdown::render_markdown;

/// Markdown renderer with optional code block highlighting.
#[derive(Clone, Default)]
pub struct HtmlRenderer {
    highlighter: Option<Arc<dyn Highlighter>>,
}

impl HtmlRenderer {
    /// Renderer that leaves code blocks exactly as pulldown-cmark emits them.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Highlight code blocks with the given highlighter.
    #[must_use]
    pub fn with_highlighter(mut self, highlighter: Arc<dyn Highlighter>) -> Self {
        self.highlighter = Some(highlighter);
        self
    }

    /// Render markdown text to an HTML fragment.
    #[must_use]
    pub fn render(&self, text: &str) -> String {
        let html = render_markdown(text);
        match &self.highlighter {
            Some(highlighter) => highlight_code_blocks(&html, highlighter.as_ref()),
            None => html,
        }
    }
}

impl std::fmt::Debug for HtmlRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HtmlRenderer")
            .field("highlight", &self.highlighter.is_some())
            .finish()
    }
}
