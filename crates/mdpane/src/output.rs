//! Terminal reporting for the mdpane commands.
//!
//! Stdout carries only command results and, under `bridge`, the JSON event
//! stream. Everything meant for the person at the terminal goes to stderr
//! through [`Output::status`].

use console::{Style, Term};

/// How a status line is colored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tone {
    Plain,
    Success,
    Warning,
    Error,
}

impl Tone {
    fn style(self) -> Style {
        match self {
            Self::Plain => Style::new(),
            Self::Success => Style::new().green(),
            Self::Warning => Style::new().yellow(),
            Self::Error => Style::new().red(),
        }
    }

    /// `msg` styled for this tone; colors follow the terminal's settings.
    fn paint(self, msg: &str) -> String {
        match self {
            Self::Plain => msg.to_owned(),
            tone => tone.style().for_stderr().apply_to(msg).to_string(),
        }
    }
}

/// Stderr status lines and stdout results.
pub(crate) struct Output {
    status: Term,
    results: Term,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            status: Term::stderr(),
            results: Term::stdout(),
        }
    }

    /// Write a status line to stderr. Terminal write failures are ignored.
    pub(crate) fn status(&self, tone: Tone, msg: &str) {
        let _ = self.status.write_line(&tone.paint(msg));
    }

    pub(crate) fn info(&self, msg: &str) {
        self.status(Tone::Plain, msg);
    }

    pub(crate) fn success(&self, msg: &str) {
        self.status(Tone::Success, msg);
    }

    pub(crate) fn warning(&self, msg: &str) {
        self.status(Tone::Warning, msg);
    }

    pub(crate) fn error(&self, msg: &str) {
        self.status(Tone::Error, msg);
    }

    /// Write a result line to stdout.
    pub(crate) fn result(&self, line: &str) -> std::io::Result<()> {
        self.results.write_line(line)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_plain_tone_is_unstyled() {
        assert_eq!(Tone::Plain.paint("Recent files:"), "Recent files:");
    }

    #[test]
    fn test_tones_use_distinct_colors() {
        let painted = |tone: Tone| {
            tone.style()
                .force_styling(true)
                .apply_to("Saved")
                .to_string()
        };

        assert!(painted(Tone::Success).contains("\u{1b}[32m"));
        assert!(painted(Tone::Warning).contains("\u{1b}[33m"));
        assert!(painted(Tone::Error).contains("\u{1b}[31m"));
    }

    #[test]
    fn test_colored_tones_keep_message_text() {
        for tone in [Tone::Success, Tone::Warning, Tone::Error] {
            assert!(tone.paint("File not found").contains("File not found"));
        }
    }
}
