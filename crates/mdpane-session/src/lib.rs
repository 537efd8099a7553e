//! Editing session core for mdpane.
//!
//! Keeps an in-memory markdown document, the file it came from and a rendered
//! preview consistent while the user edits:
//!
//! - [`DocumentSession`]: the document and its edit/preview mode
//! - [`AutoSaveScheduler`]: debounced write-back after a quiet period
//! - [`PreviewCompositor`]: markdown, highlighting and diagrams in one pass
//! - [`SessionController`]: single event loop driving all of the above
//!
//! The host talks to the controller through [`UiEvent`] and [`HostCommand`]
//! and receives [`UiMessage`]s back. Notifications and pickers go through the
//! [`Host`] trait.
//!
//! # Example
//!
//! ```
//! use mdpane_session::DocumentSession;
//!
//! let mut session = DocumentSession::new();
//! assert!(session.update_text("ignored").is_err());
//!
//! session.load("notes.md", "# Notes");
//! session.update_text("# Notes\n\nMore").unwrap();
//! assert_eq!(session.snapshot().text, "# Notes\n\nMore");
//! ```

mod autosave;
mod compositor;
mod controller;
mod document;
mod error;
mod event;

pub use autosave::{AutoSaveScheduler, AutoSaveTick, DEFAULT_AUTO_SAVE_DELAY};
pub use compositor::{PreviewCompositor, RenderedPreview};
pub use controller::{Host, SessionController, filename};
pub use document::{DocumentSession, Snapshot, ViewMode};
pub use error::SessionError;
pub use event::{HostCommand, SessionEvent, UiEvent, UiMessage};
