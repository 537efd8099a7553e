//! HTML embedding for rendered and failed diagrams.

use mdpane_renderer::escape_html;

use crate::extract::{DiagramBlock, placeholder_container};

/// Captured failure of one diagram block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderFailure {
    /// Block id within the pass.
    pub id: usize,
    /// Kind the block declared (first token of its body).
    pub declared_kind: String,
    /// Original block body.
    pub source: String,
    /// Human-readable error message.
    pub message: String,
}

impl RenderFailure {
    /// Capture a failure for `block`.
    #[must_use]
    pub fn new(block: &DiagramBlock, message: impl Into<String>) -> Self {
        Self {
            id: block.id,
            declared_kind: block.declared_kind.clone(),
            source: block.source.clone(),
            message: message.into(),
        }
    }

    /// Collapsible error region showing the message and the source.
    #[must_use]
    pub fn to_html(&self) -> String {
        format!(
            concat!(
                r#"<details class="diagram-error">"#,
                r#"<summary>Diagram error: {kind}</summary>"#,
                r#"<p class="diagram-error-message">{message}</p>"#,
                r#"<pre class="diagram-error-source"><code>{source}</code></pre>"#,
                "</details>"
            ),
            kind = escape_html(&self.declared_kind),
            message = escape_html(&self.message),
            source = escape_html(&self.source),
        )
    }
}

/// Wrap rendered diagram markup in a figure.
#[must_use]
pub fn figure_html(svg: &str) -> String {
    format!(r#"<figure class="diagram">{svg}</figure>"#)
}

/// Replace the placeholder container for block `id` of pass `pass` with a
/// container holding `markup`.
///
/// Returns `false` if the placeholder is not present.
pub fn replace_placeholder(html: &mut String, pass: &str, id: usize, markup: &str) -> bool {
    let container = placeholder_container(pass, id);
    let Some(pos) = html.find(&container) else {
        return false;
    };
    let filled = format!(r#"<div class="diagram" data-diagram-id="{id}">{markup}</div>"#);
    html.replace_range(pos..pos + container.len(), &filled);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_failure_html_escapes_everything() {
        let block = DiagramBlock::new(2, "not <a> diagram & more");
        let failure = RenderFailure::new(&block, "No diagram type detected for \"not\"");

        assert_eq!(
            failure.to_html(),
            concat!(
                r#"<details class="diagram-error">"#,
                "<summary>Diagram error: not</summary>",
                r#"<p class="diagram-error-message">No diagram type detected for &quot;not&quot;</p>"#,
                r#"<pre class="diagram-error-source"><code>not &lt;a&gt; diagram &amp; more</code></pre>"#,
                "</details>"
            )
        );
    }

    #[test]
    fn test_failure_keeps_block_fields() {
        let block = DiagramBlock::new(1, "  pie\n\"a\": 1  ");
        let failure = RenderFailure::new(&block, "boom");

        assert_eq!(failure.id, 1);
        assert_eq!(failure.declared_kind, "pie");
        assert_eq!(failure.source, "pie\n\"a\": 1");
    }

    #[test]
    fn test_figure_html() {
        assert_eq!(
            figure_html("<svg></svg>"),
            r#"<figure class="diagram"><svg></svg></figure>"#
        );
    }

    #[test]
    fn test_replace_placeholder() {
        let mut html = format!("<p>a</p>\n{}\n<p>b</p>\n", placeholder_container("p1", 0));

        assert!(replace_placeholder(&mut html, "p1", 0, "<svg/>"));
        assert_eq!(
            html,
            "<p>a</p>\n<div class=\"diagram\" data-diagram-id=\"0\"><svg/></div>\n<p>b</p>\n"
        );
        assert!(!replace_placeholder(&mut html, "p1", 0, "<svg/>"));
    }

    #[test]
    fn test_replace_placeholder_ignores_other_pass() {
        let stale = placeholder_container("old", 0);
        let mut html = format!("{stale}\n{}", placeholder_container("new", 0));

        assert!(replace_placeholder(&mut html, "new", 0, "<svg/>"));
        assert_eq!(
            html,
            format!("{stale}\n<div class=\"diagram\" data-diagram-id=\"0\"><svg/></div>")
        );
    }

    #[test]
    fn test_replace_placeholder_distinguishes_ids() {
        let mut html = format!(
            "{}{}",
            placeholder_container("p1", 1),
            placeholder_container("p1", 11)
        );

        assert!(replace_placeholder(&mut html, "p1", 1, "one"));
        assert!(replace_placeholder(&mut html, "p1", 11, "eleven"));
        assert_eq!(
            html,
            concat!(
                r#"<div class="diagram" data-diagram-id="1">one</div>"#,
                r#"<div class="diagram" data-diagram-id="11">eleven</div>"#
            )
        );
    }
}
