//! Terminal implementation of the session host.

use std::path::PathBuf;

use mdpane_session::Host;

use crate::output::Output;

/// Host that reports notifications on stderr.
///
/// A terminal has no file pickers: both pickers list what they would have
/// offered and return nothing.
pub(crate) struct TerminalHost {
    output: Output,
}

impl TerminalHost {
    pub(crate) fn new() -> Self {
        Self {
            output: Output::new(),
        }
    }
}

impl Host for TerminalHost {
    fn notify_info(&self, message: &str) {
        self.output.success(message);
    }

    fn notify_error(&self, message: &str) {
        self.output.error(message);
    }

    fn pick_file(&self) -> Option<PathBuf> {
        self.output
            .warning("No file picker available; send openRequested with a path");
        None
    }

    fn pick_recent(&self, recent: &[PathBuf]) -> Option<PathBuf> {
        self.output.info("Recent files:");
        for path in recent {
            self.output.info(&format!("  {}", path.display()));
        }
        None
    }
}
