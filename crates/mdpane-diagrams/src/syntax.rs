//! Mermaid diagram type detection.
//!
//! Mermaid decides what to draw from the first keyword of the source. A
//! source whose keyword is not a known diagram type can never render, so it
//! is rejected before any request is made.

/// Diagram type keywords understood by Mermaid.
const MERMAID_KINDS: &[&str] = &[
    "architecture-beta",
    "block-beta",
    "C4Component",
    "C4Container",
    "C4Context",
    "C4Deployment",
    "C4Dynamic",
    "classDiagram",
    "classDiagram-v2",
    "erDiagram",
    "flowchart",
    "flowchart-elk",
    "gantt",
    "gitGraph",
    "graph",
    "info",
    "journey",
    "kanban",
    "mindmap",
    "packet-beta",
    "pie",
    "quadrantChart",
    "radar-beta",
    "requirementDiagram",
    "sankey-beta",
    "sequenceDiagram",
    "stateDiagram",
    "stateDiagram-v2",
    "timeline",
    "xychart-beta",
    "zenuml",
];

/// Whether `kind` is a Mermaid diagram type keyword.
#[must_use]
pub fn is_known_kind(kind: &str) -> bool {
    MERMAID_KINDS.contains(&kind)
}

/// Find the diagram type keyword of a Mermaid source.
///
/// Skips a leading `---` front matter block, `%%` comments and directives,
/// and blank lines. A keyword may be followed directly by `;` or `:`
/// (`graph;A-->B`, `gitGraph:`).
#[must_use]
pub fn detect_kind(source: &str) -> Option<&str> {
    let mut lines = source.lines().map(str::trim).peekable();

    if lines.peek() == Some(&"---") {
        lines.next();
        for line in lines.by_ref() {
            if line == "---" {
                break;
            }
        }
    }

    let line = lines.find(|line| !line.is_empty() && !line.starts_with("%%"))?;
    let token = line
        .split(|c: char| c.is_whitespace() || c == ';')
        .next()?
        .trim_end_matches(':');
    is_known_kind(token).then_some(token)
}
