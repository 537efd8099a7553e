//! Preview compositing.
//!
//! One pass turns the current text into the full preview:
//!
//! 1. diagram fences are extracted and replaced with placeholders,
//! 2. the remaining markdown is rendered and code blocks are highlighted,
//! 3. every diagram is rendered concurrently and spliced into its placeholder.
//!
//! All diagram tasks are joined before the pass returns. A failed or panicked
//! task turns into an error region for its block only.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinSet;

use mdpane_diagrams::{
    DiagramError, DiagramExtractor, DiagramRenderer, Extraction, PassIds, RenderFailure,
    figure_html, replace_placeholder,
};
use mdpane_renderer::HtmlRenderer;

/// Result of one compositing pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPreview {
    /// Complete preview markup.
    pub html: String,
    /// Number of diagram blocks in the text.
    pub diagrams: usize,
    /// Blocks that rendered as error regions, ordered by id.
    pub failures: Vec<RenderFailure>,
}

/// Builds preview markup from document text.
#[derive(Clone)]
pub struct PreviewCompositor {
    extractor: DiagramExtractor,
    markdown: HtmlRenderer,
    diagrams: Arc<dyn DiagramRenderer>,
}

impl PreviewCompositor {
    /// Compositor using `diagrams` for diagram blocks, the default `mermaid`
    /// keyword and no code highlighting.
    #[must_use]
    pub fn new(diagrams: Arc<dyn DiagramRenderer>) -> Self {
        Self {
            extractor: DiagramExtractor::default(),
            markdown: HtmlRenderer::new(),
            diagrams,
        }
    }

    /// Use a different diagram extractor (e.g. another fence keyword).
    #[must_use]
    pub fn with_extractor(mut self, extractor: DiagramExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Use a different markdown renderer (e.g. with highlighting).
    #[must_use]
    pub fn with_markdown(mut self, markdown: HtmlRenderer) -> Self {
        self.markdown = markdown;
        self
    }

    /// Render `text` to preview markup.
    ///
    /// Never fails: diagram errors are embedded in the markup and reported in
    /// [`RenderedPreview::failures`].
    pub async fn render(&self, text: &str) -> RenderedPreview {
        let start = Instant::now();

        let Extraction { text, blocks, pass } = self.extractor.extract(text, &mut PassIds::new());
        let mut html = self.markdown.render(&text);
        let diagrams = blocks.len();

        let mut tasks = JoinSet::new();
        let mut pending = HashMap::with_capacity(blocks.len());
        for block in blocks {
            let renderer = Arc::clone(&self.diagrams);
            let task_block = block.clone();
            let handle = tasks.spawn(async move { renderer.render(&task_block).await });
            pending.insert(handle.id(), block);
        }

        let mut failures = Vec::new();
        while let Some(joined) = tasks.join_next_with_id().await {
            let (task_id, result) = match joined {
                Ok((id, result)) => (id, result),
                Err(e) => (e.id(), Err(DiagramError::Task(e.to_string()))),
            };
            let Some(block) = pending.remove(&task_id) else {
                continue;
            };

            let markup = match result {
                Ok(svg) => figure_html(&svg),
                Err(e) => {
                    tracing::debug!(id = block.id, kind = %block.declared_kind, "Diagram failed: {e}");
                    let failure = RenderFailure::new(&block, e.to_string());
                    let markup = failure.to_html();
                    failures.push(failure);
                    markup
                }
            };

            if !replace_placeholder(&mut html, &pass, block.id, &markup) {
                tracing::warn!(id = block.id, "Diagram placeholder missing from rendered markup");
            }
        }
        failures.sort_by_key(|f| f.id);

        tracing::debug!(
            diagrams,
            failures = failures.len(),
            elapsed_ms = start.elapsed().as_millis(),
            "Rendered preview"
        );

        RenderedPreview {
            html,
            diagrams,
            failures,
        }
    }
}

impl std::fmt::Debug for PreviewCompositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewCompositor")
            .field("extractor", &self.extractor)
            .field("markdown", &self.markdown)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mdpane_diagrams::{DiagramBlock, KrokiRenderer};
    use mdpane_renderer::{SyntectHighlighter, render_markdown};
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    /// Renders `pie` diagrams, rejects everything else, panics on `panic`.
    struct FakeRenderer;

    #[async_trait]
    impl DiagramRenderer for FakeRenderer {
        async fn render(&self, block: &DiagramBlock) -> Result<String, DiagramError> {
            // Later blocks finish first
            let delay = 100u64.saturating_sub(block.id as u64 * 10);
            tokio::time::sleep(Duration::from_millis(delay)).await;
            match block.declared_kind.as_str() {
                "pie" => Ok(format!("<svg id=\"d{}\"></svg>", block.id)),
                "panic" => panic!("renderer crashed"),
                kind => Err(DiagramError::UnknownKind {
                    kind: kind.to_owned(),
                }),
            }
        }
    }

    fn compositor() -> PreviewCompositor {
        PreviewCompositor::new(Arc::new(FakeRenderer))
    }

    fn count(haystack: &str, needle: &str) -> usize {
        haystack.matches(needle).count()
    }

    #[tokio::test]
    async fn test_no_diagrams_matches_markdown() {
        let text = "# Title\n\nHello *world*\n\n```rust\nfn main() {}\n```\n";

        let preview = compositor().render(text).await;

        assert_eq!(preview.html, render_markdown(text));
        assert_eq!(preview.diagrams, 0);
        assert!(preview.failures.is_empty());
        assert!(!preview.html.contains("{{DIAGRAM_"));
    }

    #[tokio::test]
    async fn test_heading_and_paragraph() {
        let preview = compositor().render("# Title\n\nHello").await;

        assert_eq!(preview.html, "<h1>Title</h1>\n<p>Hello</p>\n");
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_diagram_resolved() {
        let text = "# Charts\n\n```mermaid\npie\n\"a\": 1\n```\n\ntext\n\n```mermaid\nbogus\n```\n\n```mermaid\npie\n\"b\": 2\n```\n";

        let preview = compositor().render(text).await;

        assert_eq!(preview.diagrams, 3);
        assert!(!preview.html.contains("{{DIAGRAM_"));
        assert_eq!(count(&preview.html, r#"<figure class="diagram">"#), 2);
        assert_eq!(count(&preview.html, r#"<details class="diagram-error">"#), 1);
        assert!(preview.html.contains(r#"<svg id="d0"></svg>"#));
        assert!(preview.html.contains(r#"<svg id="d2"></svg>"#));
        assert_eq!(preview.failures.len(), 1);
        assert_eq!(preview.failures[0].id, 1);
        assert_eq!(preview.failures[0].declared_kind, "bogus");
        assert!(preview.html.starts_with("<h1>Charts</h1>"));
        assert!(preview.html.contains("<p>text</p>"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_render_isolated() {
        let text = "```mermaid\npanic\n```\n\n```mermaid\npie\n```\n";

        let preview = compositor().render(text).await;

        assert_eq!(preview.failures.len(), 1);
        assert_eq!(preview.failures[0].declared_kind, "panic");
        assert!(preview.failures[0].message.contains("Render task failed"));
        assert!(preview.html.contains(r#"<svg id="d1"></svg>"#));
        assert!(!preview.html.contains("{{DIAGRAM_"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rendering_twice_is_equivalent() {
        let text = "```mermaid\npie\n```\n\n```mermaid\nnope\n```\n";
        let compositor = compositor();

        let first = compositor.render(text).await;
        let second = compositor.render(text).await;

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_invalid_diagram_scenario() {
        let compositor = PreviewCompositor::new(Arc::new(KrokiRenderer::new(None)));
        let text = "Intro\n\n```mermaid\nnot a real diagram\n```\n";

        let preview = compositor.render(text).await;

        assert_eq!(count(&preview.html, r#"<details class="diagram-error">"#), 1);
        assert!(preview.html.contains("Diagram error: not"));
        assert!(preview.html.contains("not a real diagram"));
        assert_eq!(preview.failures.len(), 1);
        assert_eq!(preview.failures[0].source, "not a real diagram");
    }

    #[tokio::test]
    async fn test_error_source_is_escaped() {
        let text = "```mermaid\n<script>alert(1)</script>\n```\n";

        let preview = compositor().render(text).await;

        assert!(!preview.html.contains("<script>"));
        assert!(preview.html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    }

    #[tokio::test]
    async fn test_highlighting_applies_to_code_not_diagrams() {
        let compositor = compositor().with_markdown(
            HtmlRenderer::new().with_highlighter(Arc::new(SyntectHighlighter::default())),
        );
        let text = "```rust\nfn main() {}\n```\n\n```mermaid\nbad <kind>\n```\n";

        let preview = compositor.render(text).await;

        assert!(preview.html.contains(r#"<pre><code class="language-rust"><span style="#));
        assert!(preview.html.contains("<code>bad &lt;kind&gt;</code>"));
    }

    #[tokio::test]
    async fn test_literal_container_in_document_untouched() {
        let literal = r#"<div class="diagram" data-diagram-id="0">{{DIAGRAM_0}}</div>"#;
        let text = format!("{literal}\n\n```mermaid\nbogus\n```\n");

        let preview = compositor().render(&text).await;

        assert!(preview.html.starts_with(literal));
        assert_eq!(count(&preview.html, r#"<details class="diagram-error">"#), 1);
        assert_eq!(count(&preview.html, "{{DIAGRAM_"), 1);
        assert_eq!(preview.failures.len(), 1);
    }

    #[tokio::test]
    async fn test_diagram_in_list_item_stays_in_list() {
        let text = "1. one\n\n   ```mermaid\n   not x\n   ```\n\n2. two\n";

        let preview = compositor().render(text).await;

        assert_eq!(count(&preview.html, "<ol"), 1);
        assert_eq!(count(&preview.html, "<li>"), 2);
        let error = preview.html.find("diagram-error").unwrap();
        assert!(error < preview.html.find("two").unwrap());
        assert!(error > preview.html.find("one").unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_keyword() {
        let compositor = compositor().with_extractor(DiagramExtractor::new("diagram"));
        let text = "```diagram\npie\n```\n\n```mermaid\npie\n```\n";

        let preview = compositor.render(text).await;

        assert_eq!(preview.diagrams, 1);
        assert!(preview.html.contains(r#"<code class="language-mermaid">"#));
    }
}
