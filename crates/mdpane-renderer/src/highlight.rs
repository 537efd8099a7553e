//! Syntax highlighting for rendered code blocks.
//!
//! pulldown-cmark emits code blocks as `<pre><code class="language-x">` with
//! an HTML-escaped body. [`highlight_code_blocks`] finds those blocks in the
//! rendered fragment, unescapes the body, and replaces it with the markup
//! returned by a [`Highlighter`]. The `language-*` class is preserved.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::{IncludeBackground, styled_line_to_highlighted_html};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use crate::escape::{escape_html, unescape_html};

/// Theme used when none is configured or the configured one is unknown.
pub const DEFAULT_THEME: &str = "InspiredGitHub";

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

static CODE_BLOCK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<pre><code(?: class="language-([^"]*)")?>(.*?)</code></pre>"#)
        .expect("invalid code block regex")
});

/// Converts source code into HTML markup.
///
/// Implementations must return markup that is safe to embed inside
/// `<code>`: any text taken from `code` has to be escaped.
pub trait Highlighter: Send + Sync {
    /// Highlight `code` written in `language` (the fence info word, if any).
    fn highlight(&self, code: &str, language: Option<&str>) -> String;
}

/// Highlighter backed by syntect's bundled syntaxes and themes.
///
/// Produces inline `style` attributes, so the preview needs no stylesheet.
#[derive(Debug, Clone)]
pub struct SyntectHighlighter {
    theme: Theme,
}

impl Default for SyntectHighlighter {
    fn default() -> Self {
        Self::new(DEFAULT_THEME)
    }
}

impl SyntectHighlighter {
    /// Create a highlighter using the named syntect theme.
    ///
    /// Unknown theme names fall back to [`DEFAULT_THEME`].
    #[must_use]
    pub fn new(theme_name: &str) -> Self {
        let theme = THEME_SET.themes.get(theme_name).cloned().unwrap_or_else(|| {
            tracing::warn!(theme = theme_name, "Unknown highlight theme, using {DEFAULT_THEME}");
            THEME_SET.themes[DEFAULT_THEME].clone()
        });
        Self { theme }
    }

    fn try_highlight(&self, code: &str, language: &str) -> Option<String> {
        let syntax = SYNTAX_SET.find_syntax_by_token(language)?;
        let mut lines = HighlightLines::new(syntax, &self.theme);
        let mut out = String::with_capacity(code.len() * 4);

        for line in LinesWithEndings::from(code) {
            let ranges = match lines.highlight_line(line, &SYNTAX_SET) {
                Ok(ranges) => ranges,
                Err(e) => {
                    tracing::debug!(language, "Highlighting failed: {e}");
                    return None;
                }
            };
            match styled_line_to_highlighted_html(&ranges, IncludeBackground::No) {
                Ok(html) => out.push_str(&html),
                Err(e) => {
                    tracing::debug!(language, "Highlighting failed: {e}");
                    return None;
                }
            }
        }

        Some(out)
    }
}

impl Highlighter for SyntectHighlighter {
    fn highlight(&self, code: &str, language: Option<&str>) -> String {
        language
            .and_then(|lang| self.try_highlight(code, lang))
            .unwrap_or_else(|| escape_html(code))
    }
}

/// Rewrite every `<pre><code>` block in `html` through `highlighter`.
#[must_use]
pub fn highlight_code_blocks(html: &str, highlighter: &dyn Highlighter) -> String {
    CODE_BLOCK_PATTERN
        .replace_all(html, |caps: &Captures| {
            let language = caps.get(1).map(|m| unescape_html(m.as_str()));
            let code = unescape_html(&caps[2]);
            let body = highlighter.highlight(&code, language.as_deref());

            match language {
                Some(lang) => format!(
                    r#"<pre><code class="language-{}">{body}</code></pre>"#,
                    escape_html(&lang)
                ),
                None => format!("<pre><code>{body}</code></pre>"),
            }
        })
        .into_owned()
}
