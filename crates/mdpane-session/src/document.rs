//! The in-memory document and its view state.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// Which pane the user is looking at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Raw markdown editor.
    #[default]
    Edit,
    /// Rendered preview.
    Preview,
}

impl ViewMode {
    /// The other mode.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Edit => Self::Preview,
            Self::Preview => Self::Edit,
        }
    }
}

/// Read-only copy of the document state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Snapshot {
    /// Backing file, `None` while no document is loaded.
    pub path: Option<PathBuf>,
    /// Current text.
    pub text: String,
    /// Current view.
    pub view_mode: ViewMode,
}

#[derive(Debug, Default)]
enum State {
    #[default]
    Empty,
    Loaded {
        path: PathBuf,
        text: String,
        view_mode: ViewMode,
    },
}

/// Owner of the single open document.
///
/// Starts `Empty`; [`load`](Self::load) moves it to `Loaded` in edit mode.
/// The text held here is the source of truth: the preview is derived from it
/// and the file on disk catches up through auto-save.
#[derive(Debug, Default)]
pub struct DocumentSession {
    state: State,
}

impl DocumentSession {
    /// Create an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace whatever is loaded with `text` from `path`, in edit mode.
    ///
    /// Unsaved edits to a previously loaded document are discarded.
    pub fn load(&mut self, path: impl Into<PathBuf>, text: impl Into<String>) {
        self.state = State::Loaded {
            path: path.into(),
            text: text.into(),
            view_mode: ViewMode::Edit,
        };
    }

    /// Replace the text of the loaded document.
    pub fn update_text(&mut self, new_text: impl Into<String>) -> Result<(), SessionError> {
        match &mut self.state {
            State::Empty => Err(SessionError::NoDocument),
            State::Loaded { text, .. } => {
                *text = new_text.into();
                Ok(())
            }
        }
    }

    /// Flip between edit and preview. Returns the new mode, or `None` while
    /// no document is loaded.
    pub fn toggle_view_mode(&mut self) -> Option<ViewMode> {
        match &mut self.state {
            State::Empty => None,
            State::Loaded { view_mode, .. } => {
                *view_mode = view_mode.toggled();
                Some(*view_mode)
            }
        }
    }

    /// Copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        match &self.state {
            State::Empty => Snapshot::default(),
            State::Loaded {
                path,
                text,
                view_mode,
            } => Snapshot {
                path: Some(path.clone()),
                text: text.clone(),
                view_mode: *view_mode,
            },
        }
    }

    /// Whether a document is loaded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        matches!(self.state, State::Loaded { .. })
    }

    /// Path of the loaded document.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match &self.state {
            State::Empty => None,
            State::Loaded { path, .. } => Some(path),
        }
    }

    /// Text of the loaded document (empty while `Empty`).
    #[must_use]
    pub fn text(&self) -> &str {
        match &self.state {
            State::Empty => "",
            State::Loaded { text, .. } => text,
        }
    }

    /// Current view mode (`Edit` while `Empty`).
    #[must_use]
    pub fn view_mode(&self) -> ViewMode {
        match &self.state {
            State::Empty => ViewMode::Edit,
            State::Loaded { view_mode, .. } => *view_mode,
        }
    }
}
