//! Messages exchanged between the session and its host.
//!
//! All types serialize as JSON objects tagged with a camelCase `type` field,
//! e.g. `{"type": "contentChanged", "content": "# Title"}`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::document::ViewMode;

/// Inbound event from the editor view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum UiEvent {
    /// The view finished loading and can receive content.
    Ready,
    /// The user edited the text.
    ContentChanged {
        /// Full new text.
        content: String,
    },
    /// Switch between editor and preview.
    ToggleRequested,
    /// Open a file, or ask the host to pick one when `path` is absent.
    OpenRequested {
        /// File to open.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<PathBuf>,
    },
    /// The view became visible again after being hidden.
    VisibilityRestored,
    /// Write the document now.
    SaveRequested,
}

/// Outbound message to the editor view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum UiMessage {
    /// Show `content` in the editor.
    LoadContent {
        /// Document text.
        content: String,
        /// Display name of the file.
        filename: String,
    },
    /// The view mode changed.
    PreviewModeChanged {
        /// New mode.
        mode: ViewMode,
    },
    /// Replace the preview pane with `html`.
    PreviewContent {
        /// Composited preview markup.
        html: String,
    },
    /// Nothing is open; show the empty-state placeholder.
    ShowPlaceholder,
}

/// Command triggered from the host (menus, palette, context menu).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HostCommand {
    /// Pick a file and open it.
    OpenFile,
    /// Pick from the recent files and open the choice.
    ShowRecentFiles,
    /// Switch between editor and preview.
    TogglePreview,
    /// Open a file selected in the host.
    OpenFromContext {
        /// File to open.
        path: PathBuf,
    },
    /// Write the document now.
    Save,
}

/// Anything the controller's queue accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionEvent {
    /// Event from the view.
    Ui(UiEvent),
    /// Command from the host.
    Command(HostCommand),
}

impl From<UiEvent> for SessionEvent {
    fn from(event: UiEvent) -> Self {
        Self::Ui(event)
    }
}

impl From<HostCommand> for SessionEvent {
    fn from(command: HostCommand) -> Self {
        Self::Command(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_ui_event_wire_format() {
        let event: UiEvent =
            serde_json::from_value(json!({"type": "contentChanged", "content": "# A"})).unwrap();
        assert_eq!(
            event,
            UiEvent::ContentChanged {
                content: "# A".to_owned()
            }
        );

        let event: UiEvent = serde_json::from_value(json!({"type": "visibilityRestored"})).unwrap();
        assert_eq!(event, UiEvent::VisibilityRestored);
    }

    #[test]
    fn test_open_requested_path_optional() {
        let event: UiEvent = serde_json::from_value(json!({"type": "openRequested"})).unwrap();
        assert_eq!(event, UiEvent::OpenRequested { path: None });

        let event: UiEvent =
            serde_json::from_value(json!({"type": "openRequested", "path": "/a.md"})).unwrap();
        assert_eq!(
            event,
            UiEvent::OpenRequested {
                path: Some(PathBuf::from("/a.md"))
            }
        );
    }

    #[test]
    fn test_ui_message_wire_format() {
        let message = UiMessage::PreviewModeChanged {
            mode: ViewMode::Preview,
        };
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({"type": "previewModeChanged", "mode": "preview"})
        );

        let message = UiMessage::LoadContent {
            content: "x".to_owned(),
            filename: "a.md".to_owned(),
        };
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({"type": "loadContent", "content": "x", "filename": "a.md"})
        );

        assert_eq!(
            serde_json::to_value(&UiMessage::ShowPlaceholder).unwrap(),
            json!({"type": "showPlaceholder"})
        );
    }

    #[test]
    fn test_session_event_envelope() {
        let event: SessionEvent =
            serde_json::from_value(json!({"command": {"type": "openFromContext", "path": "b.md"}}))
                .unwrap();
        assert_eq!(
            event,
            SessionEvent::Command(HostCommand::OpenFromContext {
                path: PathBuf::from("b.md")
            })
        );

        let event: SessionEvent = serde_json::from_value(json!({"ui": {"type": "ready"}})).unwrap();
        assert_eq!(event, SessionEvent::Ui(UiEvent::Ready));
    }

    #[test]
    fn test_unknown_event_rejected() {
        assert!(serde_json::from_value::<UiEvent>(json!({"type": "explode"})).is_err());
    }
}
