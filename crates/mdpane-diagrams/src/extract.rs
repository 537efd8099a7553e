//! Fenced diagram block extraction.
//!
//! A line-oriented scanner finds fenced code blocks whose info string starts
//! with the diagram keyword and replaces each with a placeholder container
//! tagged with a per-pass id:
//!
//! ```text
//! <div class="diagram" data-diagram-id="0">{{DIAGRAM_3f9c2a01d4e5b677_0}}</div>
//! ```
//!
//! The hex part is the pass tag, derived from the hash of the input text. A
//! document cannot contain a container carrying its own hash, so only
//! extracted blocks are ever filled.
//!
//! The container keeps the fence's indentation and is surrounded by blank
//! lines, so the markdown renderer emits it as a raw HTML block inside the
//! same list item. Other fenced blocks are skipped whole, so a diagram fence
//! quoted inside another code block is left alone. A diagram fence with no
//! closing line is not a diagram and stays in the text unchanged.

use std::fmt::Write;

use sha2::{Digest, Sha256};

use crate::consts::{DEFAULT_KEYWORD, UNKNOWN_KIND};

/// Hex digits of the text hash used as pass tag.
const PASS_TAG_LEN: usize = 16;

/// A diagram found in the document during one render pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramBlock {
    /// Id unique within the pass, in document order starting at 0.
    pub id: usize,
    /// Block body with surrounding whitespace trimmed.
    pub source: String,
    /// First whitespace-delimited token of the body, or `"unknown"`.
    pub declared_kind: String,
}

impl DiagramBlock {
    /// Create a block from its raw body.
    #[must_use]
    pub fn new(id: usize, body: &str) -> Self {
        let source = body.trim().to_owned();
        let declared_kind = source
            .split_whitespace()
            .next()
            .unwrap_or(UNKNOWN_KIND)
            .to_owned();
        Self {
            id,
            source,
            declared_kind,
        }
    }
}

/// Id counter for a single render pass.
///
/// Create a fresh counter per pass; ids are not stable across passes.
#[derive(Debug, Default)]
pub struct PassIds {
    next: usize,
}

impl PassIds {
    /// Counter starting at 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next id.
    pub fn next_id(&mut self) -> usize {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// Text with diagram blocks replaced by placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Transformed markdown.
    pub text: String,
    /// Extracted blocks in document order.
    pub blocks: Vec<DiagramBlock>,
    /// Tag shared by every placeholder of this pass.
    pub pass: String,
}

/// Placeholder token for block `id` of pass `pass`.
#[must_use]
pub fn placeholder(pass: &str, id: usize) -> String {
    format!("{{{{DIAGRAM_{pass}_{id}}}}}")
}

/// Placeholder container as it appears in rendered HTML.
#[must_use]
pub fn placeholder_container(pass: &str, id: usize) -> String {
    format!(
        r#"<div class="diagram" data-diagram-id="{id}">{}</div>"#,
        placeholder(pass, id)
    )
}

fn pass_tag(text: &str) -> String {
    let mut tag = hex::encode(Sha256::digest(text.as_bytes()));
    tag.truncate(PASS_TAG_LEN);
    tag
}

/// Scanner for fenced diagram blocks.
#[derive(Debug, Clone)]
pub struct DiagramExtractor {
    keyword: String,
}

impl Default for DiagramExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_KEYWORD)
    }
}

#[derive(Debug, Clone, Copy)]
struct Fence {
    ch: char,
    len: usize,
    indent: usize,
}

enum State<'a> {
    Text,
    Code(Fence),
    Diagram {
        fence: Fence,
        start: usize,
        body: Vec<&'a str>,
    },
}

impl DiagramExtractor {
    /// Extractor for fences whose info string starts with `keyword`.
    #[must_use]
    pub fn new(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
        }
    }

    /// The fence keyword this extractor matches.
    #[must_use]
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Replace every closed diagram fence in `text` with a placeholder.
    ///
    /// Ids are taken from `ids` in document order.
    pub fn extract(&self, text: &str, ids: &mut PassIds) -> Extraction {
        let pass = pass_tag(text);
        let mut out = String::with_capacity(text.len());
        let mut blocks = Vec::new();
        let mut state = State::Text;
        let mut offset = 0;

        for line in text.split_inclusive('\n') {
            let line_start = offset;
            offset += line.len();

            state = match state {
                State::Text => match parse_fence(line) {
                    Some((fence, info)) if self.is_diagram_info(info) => State::Diagram {
                        fence,
                        start: line_start,
                        body: Vec::new(),
                    },
                    Some((fence, _)) => {
                        out.push_str(line);
                        State::Code(fence)
                    }
                    None => {
                        out.push_str(line);
                        State::Text
                    }
                },
                State::Code(fence) => {
                    out.push_str(line);
                    if is_closing(line, fence) {
                        State::Text
                    } else {
                        State::Code(fence)
                    }
                }
                State::Diagram {
                    fence,
                    start,
                    mut body,
                } => {
                    if is_closing(line, fence) {
                        let block = DiagramBlock::new(ids.next_id(), &body.concat());
                        let _ = write!(
                            out,
                            "\n{:indent$}{}\n\n",
                            "",
                            placeholder_container(&pass, block.id),
                            indent = fence.indent
                        );
                        blocks.push(block);
                        State::Text
                    } else {
                        body.push(strip_indent(line, fence.indent));
                        State::Diagram { fence, start, body }
                    }
                }
            };
        }

        if let State::Diagram { start, .. } = state {
            out.push_str(&text[start..]);
        }

        Extraction {
            text: out,
            blocks,
            pass,
        }
    }

    fn is_diagram_info(&self, info: &str) -> bool {
        info.split_whitespace().next() == Some(self.keyword.as_str())
    }
}

/// Extract diagram blocks using the default `mermaid` keyword.
pub fn extract(text: &str, ids: &mut PassIds) -> Extraction {
    DiagramExtractor::default().extract(text, ids)
}

/// Parse an opening or closing fence line into its fence and info string.
fn parse_fence(line: &str) -> Option<(Fence, &str)> {
    let line = line.trim_end_matches(['\n', '\r']);
    let rest = line.trim_start_matches(' ');
    let indent = line.len() - rest.len();
    if indent > 3 {
        return None;
    }

    let ch = rest.chars().next()?;
    if ch != '`' && ch != '~' {
        return None;
    }

    let after = rest.trim_start_matches(ch);
    let len = rest.len() - after.len();
    if len < 3 {
        return None;
    }

    let info = after.trim();
    if ch == '`' && info.contains('`') {
        return None;
    }

    Some((Fence { ch, len, indent }, info))
}

fn is_closing(line: &str, open: Fence) -> bool {
    parse_fence(line)
        .is_some_and(|(fence, info)| fence.ch == open.ch && fence.len >= open.len && info.is_empty())
}

/// Remove up to `indent` leading spaces, as the fence's own indentation.
fn strip_indent(line: &str, indent: usize) -> &str {
    let spaces = line.len() - line.trim_start_matches(' ').len();
    &line[spaces.min(indent)..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn run(text: &str) -> Extraction {
        extract(text, &mut PassIds::new())
    }

    #[test]
    fn test_no_diagrams_leaves_text_unchanged() {
        let text = "# Title\n\nSome text\n\n```rust\nfn main() {}\n```\n";
        let result = run(text);

        assert_eq!(result.text, text);
        assert!(result.blocks.is_empty());
    }

    #[test]
    fn test_single_diagram_replaced() {
        let result = run("# T\n\n```mermaid\ngraph TD\n  A-->B\n```\n\nafter");

        assert_eq!(
            result.text,
            format!(
                "# T\n\n\n{}\n\n\nafter",
                placeholder_container(&result.pass, 0)
            )
        );
        assert_eq!(
            result.blocks,
            vec![DiagramBlock {
                id: 0,
                source: "graph TD\n  A-->B".to_owned(),
                declared_kind: "graph".to_owned(),
            }]
        );
    }

    #[test]
    fn test_ids_sequential_in_document_order() {
        let text = "```mermaid\nsequenceDiagram\n```\ntext\n```mermaid\npie\n```\n";
        let result = run(text);

        let ids: Vec<usize> = result.blocks.iter().map(|b| b.id).collect();
        let kinds: Vec<&str> = result
            .blocks
            .iter()
            .map(|b| b.declared_kind.as_str())
            .collect();
        assert_eq!(ids, vec![0, 1]);
        assert_eq!(kinds, vec!["sequenceDiagram", "pie"]);
        assert!(result.text.contains(&placeholder(&result.pass, 0)));
        assert!(result.text.contains(&placeholder(&result.pass, 1)));
    }

    #[test]
    fn test_fresh_counter_restarts_ids() {
        let text = "```mermaid\npie\n```\n";
        let mut ids = PassIds::new();
        extract(text, &mut ids);
        let second = extract(text, &mut ids);
        assert_eq!(second.blocks[0].id, 1);
        assert_eq!(ids.next_id(), 2);

        let fresh = run(text);
        assert_eq!(fresh.blocks[0].id, 0);
    }

    #[test]
    fn test_first_closing_fence_wins() {
        let result = run("```mermaid\ngraph\n```\nmiddle\n```\n");

        assert_eq!(result.blocks.len(), 1);
        assert_eq!(result.blocks[0].source, "graph");
        assert!(result.text.ends_with("</div>\n\nmiddle\n```\n"));
    }

    #[test]
    fn test_unclosed_fence_left_untouched() {
        let text = "intro\n\n```mermaid\ngraph TD\n  A-->B\n";
        let result = run(text);

        assert_eq!(result.text, text);
        assert!(result.blocks.is_empty());
    }

    #[test]
    fn test_unclosed_after_closed_keeps_first() {
        let text = "```mermaid\npie\n```\n```mermaid\ngraph\n";
        let result = run(text);

        assert_eq!(result.blocks.len(), 1);
        assert!(result.text.ends_with("```mermaid\ngraph\n"));
    }

    #[test]
    fn test_tilde_fence() {
        let result = run("~~~mermaid\nflowchart LR\n~~~\n");
        assert_eq!(result.blocks[0].declared_kind, "flowchart");
    }

    #[test]
    fn test_closing_fence_must_match_char_and_length() {
        let result = run("````mermaid\npie\n```\n~~~~\n````\n");

        assert_eq!(result.blocks.len(), 1);
        assert_eq!(result.blocks[0].source, "pie\n```\n~~~~");
    }

    #[test]
    fn test_longer_closing_fence_closes() {
        let result = run("```mermaid\npie\n`````\n");
        assert_eq!(result.blocks[0].source, "pie");
    }

    #[test]
    fn test_closing_fence_with_info_does_not_close() {
        let result = run("```mermaid\npie\n``` trailing\n```\n");
        assert_eq!(result.blocks[0].source, "pie\n``` trailing");
    }

    #[test]
    fn test_info_string_with_attributes() {
        let result = run("```mermaid theme=dark\npie\n```\n");
        assert_eq!(result.blocks.len(), 1);
    }

    #[test]
    fn test_keyword_must_be_whole_word() {
        let result = run("```mermaidjs\npie\n```\n");
        assert!(result.blocks.is_empty());
    }

    #[test]
    fn test_indented_fence() {
        assert_eq!(run("   ```mermaid\n   pie\n   ```\n").blocks.len(), 1);
        assert!(run("    ```mermaid\n    pie\n    ```\n").blocks.is_empty());
    }

    #[test]
    fn test_diagram_inside_other_code_block_ignored() {
        let text = "````markdown\n```mermaid\npie\n```\n````\n";
        let result = run(text);

        assert_eq!(result.text, text);
        assert!(result.blocks.is_empty());
    }

    #[test]
    fn test_empty_body_has_unknown_kind() {
        let result = run("```mermaid\n\n```\n");

        assert_eq!(result.blocks[0].source, "");
        assert_eq!(result.blocks[0].declared_kind, "unknown");
    }

    #[test]
    fn test_crlf_line_endings() {
        let result = run("```mermaid\r\npie\r\n```\r\n");
        assert_eq!(result.blocks[0].source, "pie");
    }

    #[test]
    fn test_custom_keyword() {
        let extractor = DiagramExtractor::new("diagram");
        let result = extractor.extract(
            "```diagram\ngraph\n```\n```mermaid\npie\n```\n",
            &mut PassIds::new(),
        );

        assert_eq!(extractor.keyword(), "diagram");
        assert_eq!(result.blocks.len(), 1);
        assert_eq!(result.blocks[0].declared_kind, "graph");
    }

    #[test]
    fn test_placeholder_container() {
        assert_eq!(placeholder("ab12", 3), "{{DIAGRAM_ab12_3}}");
        assert_eq!(
            placeholder_container("ab12", 3),
            r#"<div class="diagram" data-diagram-id="3">{{DIAGRAM_ab12_3}}</div>"#
        );
    }

    #[test]
    fn test_pass_tag_follows_text() {
        let first = run("```mermaid\npie\n```\n");
        let again = run("```mermaid\npie\n```\n");
        let other = run("```mermaid\ngraph\n```\n");

        assert_eq!(first.pass, again.pass);
        assert_ne!(first.pass, other.pass);
        assert_eq!(first.pass.len(), PASS_TAG_LEN);
    }

    #[test]
    fn test_literal_container_in_text_is_not_a_placeholder() {
        let forged = placeholder_container(&pass_tag("x"), 0);
        let text = format!("{forged}\n\n```mermaid\npie\n```\n");
        let result = run(&text);

        assert!(result.text.starts_with(&forged));
        assert_ne!(placeholder_container(&result.pass, 0), forged);
        assert_eq!(result.text.matches(&placeholder(&result.pass, 0)).count(), 1);
    }

    #[test]
    fn test_indented_fence_keeps_indentation() {
        let result = run("1. one\n\n   ```mermaid\n   graph TD\n     A-->B\n   ```\n\n2. two\n");

        assert_eq!(
            result.text,
            format!(
                "1. one\n\n\n   {}\n\n\n2. two\n",
                placeholder_container(&result.pass, 0)
            )
        );
        assert_eq!(result.blocks[0].source, "graph TD\n  A-->B");
    }
}
