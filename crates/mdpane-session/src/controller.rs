//! Session orchestration.
//!
//! [`SessionController`] owns the document and drives every other component
//! from a single event loop. UI events, host commands and auto-save ticks
//! are handled one at a time in arrival order, so the document needs no
//! lock: loads finish before the next edit is applied and a preview pass is
//! awaited before the next event is taken.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use mdpane_state::RecentFiles;
use mdpane_storage::Storage;

use crate::autosave::{AutoSaveScheduler, AutoSaveTick, DEFAULT_AUTO_SAVE_DELAY};
use crate::compositor::PreviewCompositor;
use crate::document::{DocumentSession, ViewMode};
use crate::error::SessionError;
use crate::event::{HostCommand, SessionEvent, UiEvent, UiMessage};

/// Host editor capabilities the session relies on.
///
/// Notifications are transient messages; pickers return `None` when the user
/// dismisses them.
pub trait Host: Send + Sync {
    /// Show an informational notification.
    fn notify_info(&self, message: &str);

    /// Show an error notification.
    fn notify_error(&self, message: &str);

    /// Let the user choose a markdown file.
    fn pick_file(&self) -> Option<PathBuf>;

    /// Let the user choose one of `recent` (most recent first).
    fn pick_recent(&self, recent: &[PathBuf]) -> Option<PathBuf>;
}

/// Display name of a path: the last segment after `/` or `\`.
#[must_use]
pub fn filename(path: &Path) -> String {
    let raw = path.to_string_lossy();
    raw.rsplit(['/', '\\']).next().unwrap_or_default().to_owned()
}

/// Orchestrator for one editing session.
///
/// Lifecycle: construct, drive with [`run`](Self::run) (or the individual
/// handlers), then [`dispose`](Self::dispose).
pub struct SessionController {
    document: DocumentSession,
    autosave: AutoSaveScheduler,
    ticks: mpsc::UnboundedReceiver<AutoSaveTick>,
    recent: RecentFiles,
    compositor: PreviewCompositor,
    storage: Arc<dyn Storage>,
    host: Arc<dyn Host>,
    ui: mpsc::UnboundedSender<UiMessage>,
    disposed: bool,
}

impl SessionController {
    /// Create a controller with the default one second auto-save delay.
    #[must_use]
    pub fn new(
        storage: Arc<dyn Storage>,
        recent: RecentFiles,
        compositor: PreviewCompositor,
        host: Arc<dyn Host>,
        ui: mpsc::UnboundedSender<UiMessage>,
    ) -> Self {
        let (autosave, ticks) = AutoSaveScheduler::channel(DEFAULT_AUTO_SAVE_DELAY);
        Self {
            document: DocumentSession::new(),
            autosave,
            ticks,
            recent,
            compositor,
            storage,
            host,
            ui,
            disposed: false,
        }
    }

    /// Configure auto-save. Replaces the scheduler, dropping any pending timer.
    #[must_use]
    pub fn with_auto_save(mut self, delay: Duration, enabled: bool) -> Self {
        let (mut autosave, ticks) = AutoSaveScheduler::channel(delay);
        autosave.set_enabled(enabled);
        self.autosave = autosave;
        self.ticks = ticks;
        self
    }

    /// The document owned by this session.
    #[must_use]
    pub fn document(&self) -> &DocumentSession {
        &self.document
    }

    /// Recent files store.
    #[must_use]
    pub fn recent(&self) -> &RecentFiles {
        &self.recent
    }

    /// Whether an auto-save is waiting for its quiet period.
    #[must_use]
    pub fn autosave_pending(&self) -> bool {
        self.autosave.is_pending()
    }

    /// Process events until `events` closes, then dispose.
    ///
    /// An auto-save still waiting for its quiet period when the queue closes
    /// is written before disposal.
    pub async fn run(&mut self, events: &mut mpsc::UnboundedReceiver<SessionEvent>) {
        tracing::debug!("Session started");
        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.handle_event(event).await,
                    None => break,
                },
                Some(tick) = self.ticks.recv() => {
                    self.on_tick(tick).await;
                }
            }
        }
        self.flush_pending().await;
        self.dispose();
    }

    /// Handle one queued event.
    pub async fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Ui(event) => self.handle(event).await,
            SessionEvent::Command(command) => self.handle_command(command).await,
        }
    }

    /// Handle an event from the view.
    pub async fn handle(&mut self, event: UiEvent) {
        if self.disposed {
            return;
        }
        match event {
            UiEvent::Ready | UiEvent::VisibilityRestored => self.show_current().await,
            UiEvent::ContentChanged { content } => self.content_changed(content),
            UiEvent::ToggleRequested => self.toggle_preview().await,
            UiEvent::OpenRequested { path: Some(path) } => self.open_and_report(&path).await,
            UiEvent::OpenRequested { path: None } => self.pick_and_open().await,
            UiEvent::SaveRequested => self.save_and_report().await,
        }
    }

    /// Handle a command from the host.
    pub async fn handle_command(&mut self, command: HostCommand) {
        if self.disposed {
            return;
        }
        match command {
            HostCommand::OpenFile => self.pick_and_open().await,
            HostCommand::ShowRecentFiles => self.pick_recent_and_open().await,
            HostCommand::TogglePreview => self.toggle_preview().await,
            HostCommand::OpenFromContext { path } => self.open_and_report(&path).await,
            HostCommand::Save => self.save_and_report().await,
        }
    }

    /// Apply an edit and re-arm auto-save. Ignored while nothing is loaded.
    pub fn content_changed(&mut self, content: String) {
        match self.document.update_text(content) {
            Ok(()) => self.autosave.notify_changed(),
            Err(e) => tracing::debug!("Ignoring edit: {e}"),
        }
    }

    /// Read `path`, load it, and record it as recent and last file.
    ///
    /// On failure the current document is left untouched. A pending
    /// auto-save of the previous document is dropped, not flushed.
    pub async fn open(&mut self, path: &Path) -> Result<(), SessionError> {
        let bytes = self.read_file(path).await?;
        let text = String::from_utf8(bytes).map_err(|source| SessionError::InvalidUtf8 {
            path: path.to_path_buf(),
            source,
        })?;

        self.autosave.cancel();
        self.document.load(path, text);
        self.recent.touch(path);
        self.recent.set_last_file(path);
        tracing::info!(path = %path.display(), "Opened document");

        self.send(UiMessage::LoadContent {
            content: self.document.text().to_owned(),
            filename: filename(path),
        });
        self.send(UiMessage::PreviewModeChanged {
            mode: ViewMode::Edit,
        });
        Ok(())
    }

    /// Reopen the file from the previous session.
    ///
    /// A stored path that no longer exists is forgotten silently. Returns
    /// whether a document was loaded; otherwise the placeholder is shown.
    pub async fn restore_last(&mut self) -> bool {
        let Some(path) = self.recent.last_file() else {
            self.send(UiMessage::ShowPlaceholder);
            return false;
        };

        match self.open(&path).await {
            Ok(()) => true,
            Err(e) if e.is_not_found() => {
                tracing::info!(path = %path.display(), "Last file no longer exists");
                self.recent.clear_last_file();
                self.send(UiMessage::ShowPlaceholder);
                false
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), "Failed to restore last file: {e}");
                self.send(UiMessage::ShowPlaceholder);
                false
            }
        }
    }

    /// Flip the view mode; entering preview renders the current text.
    pub async fn toggle_preview(&mut self) {
        let Some(mode) = self.document.toggle_view_mode() else {
            tracing::debug!("Toggle ignored, no document");
            return;
        };
        self.send(UiMessage::PreviewModeChanged { mode });

        if mode == ViewMode::Preview {
            let text = self.document.text().to_owned();
            let preview = self.compositor.render(&text).await;
            self.send(UiMessage::PreviewContent { html: preview.html });
        }
    }

    /// Write the current text immediately, bypassing the quiet period.
    pub async fn save_now(&mut self) -> Result<PathBuf, SessionError> {
        let snapshot = self.document.snapshot();
        let path = snapshot.path.ok_or(SessionError::NoDocument)?;

        self.autosave.cancel();
        self.write_file(&path, snapshot.text).await?;
        Ok(path)
    }

    /// Wait for the next auto-save tick and handle it.
    ///
    /// Returns whether the tick was live (not superseded).
    pub async fn flush_autosave_tick(&mut self) -> bool {
        match self.ticks.recv().await {
            Some(tick) => self.on_tick(tick).await,
            None => false,
        }
    }

    /// Stop the session: cancel pending auto-save and ignore further events.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.autosave.cancel();
        self.disposed = true;
        tracing::debug!("Session disposed");
    }

    /// Write a pending auto-save now instead of waiting for its timer.
    async fn flush_pending(&mut self) {
        if self.disposed || !self.autosave.is_pending() {
            return;
        }
        self.autosave.cancel();

        let snapshot = self.document.snapshot();
        let Some(path) = snapshot.path else {
            return;
        };
        match self.write_file(&path, snapshot.text).await {
            Ok(()) => tracing::debug!(path = %path.display(), "Flushed pending auto-save"),
            Err(e) => tracing::warn!(path = %path.display(), "Auto-save failed: {e}"),
        }
    }

    async fn on_tick(&mut self, tick: AutoSaveTick) -> bool {
        if !self.autosave.accept(tick) {
            tracing::trace!(generation = tick.0, "Stale auto-save tick");
            return false;
        }

        let snapshot = self.document.snapshot();
        let Some(path) = snapshot.path else {
            return true;
        };

        match self.write_file(&path, snapshot.text).await {
            Ok(()) => tracing::debug!(path = %path.display(), "Auto-saved"),
            Err(e) => tracing::warn!(path = %path.display(), "Auto-save failed: {e}"),
        }
        true
    }

    async fn show_current(&mut self) {
        if !self.document.is_loaded() {
            self.restore_last().await;
            return;
        }

        let snapshot = self.document.snapshot();
        let filename = snapshot.path.as_deref().map(filename).unwrap_or_default();
        self.send(UiMessage::LoadContent {
            content: snapshot.text.clone(),
            filename,
        });
        self.send(UiMessage::PreviewModeChanged {
            mode: snapshot.view_mode,
        });
        if snapshot.view_mode == ViewMode::Preview {
            let preview = self.compositor.render(&snapshot.text).await;
            self.send(UiMessage::PreviewContent { html: preview.html });
        }
    }

    async fn open_and_report(&mut self, path: &Path) {
        if let Err(e) = self.open(path).await {
            let message = if e.is_not_found() {
                if self.recent.last_file().as_deref() == Some(path) {
                    self.recent.clear_last_file();
                }
                format!("File no longer exists: {}", path.display())
            } else {
                format!("Failed to open {}: {e}", filename(path))
            };
            tracing::warn!(path = %path.display(), "{message}");
            self.host.notify_error(&message);
        }
    }

    async fn pick_and_open(&mut self) {
        if let Some(path) = self.host.pick_file() {
            self.open_and_report(&path).await;
        }
    }

    async fn pick_recent_and_open(&mut self) {
        let recent = self.recent.list();
        if recent.is_empty() {
            self.host.notify_info("No recent files");
            return;
        }
        if let Some(path) = self.host.pick_recent(&recent) {
            self.open_and_report(&path).await;
        }
    }

    async fn save_and_report(&mut self) {
        match self.save_now().await {
            Ok(path) => self.host.notify_info(&format!("Saved {}", filename(&path))),
            Err(SessionError::NoDocument) => self.host.notify_error("No document is open"),
            Err(e) => {
                let name = self.document.path().map(filename).unwrap_or_default();
                tracing::warn!("Save failed: {e}");
                self.host.notify_error(&format!("Failed to save {name}: {e}"));
            }
        }
    }

    async fn read_file(&self, path: &Path) -> Result<Vec<u8>, SessionError> {
        let storage = Arc::clone(&self.storage);
        let path = path.to_path_buf();
        let bytes = tokio::task::spawn_blocking(move || storage.read(&path))
            .await
            .map_err(|e| SessionError::Task(e.to_string()))??;
        Ok(bytes)
    }

    async fn write_file(&self, path: &Path, text: String) -> Result<(), SessionError> {
        let storage = Arc::clone(&self.storage);
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || storage.write(&path, text.as_bytes()))
            .await
            .map_err(|e| SessionError::Task(e.to_string()))??;
        Ok(())
    }

    fn send(&self, message: UiMessage) {
        if self.ui.send(message).is_err() {
            tracing::debug!("View closed, dropping message");
        }
    }
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("document", &self.document)
            .field("autosave", &self.autosave)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}
