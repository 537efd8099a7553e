//! pulldown-cmark based markdown rendering.

use pulldown_cmark::{Options, Parser, html};

/// Extensions enabled for every render.
fn options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
}

/// Render markdown text to an HTML fragment.
///
/// Raw HTML blocks are passed through unchanged, which is what lets diagram
/// placeholders survive the render.
#[must_use]
pub fn render_markdown(text: &str) -> String {
    let parser = Parser::new_ext(text, options());
    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}
