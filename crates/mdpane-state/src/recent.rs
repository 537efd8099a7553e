//! Most-recently-used file list and last-file pointer.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::{SettingsStore, SettingsStoreExt};

/// Settings key for the recent files list (JSON array of paths).
pub const RECENT_FILES_KEY: &str = "recentFiles";

/// Settings key for the last opened file (JSON string).
pub const LAST_FILE_KEY: &str = "lastFile";

/// Default bound on the recent files list.
pub const DEFAULT_MAX_RECENT: usize = 10;

/// Ordered, de-duplicated, bounded list of previously opened paths.
///
/// Most recent first. Every mutation is written through to the backing
/// [`SettingsStore`]. Entries are not validated against the filesystem: a
/// path that no longer exists stays in the list until it is pushed out, and
/// callers report the missing file themselves.
pub struct RecentFiles {
    settings: Arc<dyn SettingsStore>,
    max: usize,
}

impl RecentFiles {
    /// Create a store bounded to [`DEFAULT_MAX_RECENT`] entries.
    #[must_use]
    pub fn new(settings: Arc<dyn SettingsStore>) -> Self {
        Self::with_max(settings, DEFAULT_MAX_RECENT)
    }

    /// Create a store bounded to `max` entries (at least one).
    #[must_use]
    pub fn with_max(settings: Arc<dyn SettingsStore>, max: usize) -> Self {
        Self {
            settings,
            max: max.max(1),
        }
    }

    /// Move `path` to the front of the list, evicting the oldest entries
    /// beyond the bound. Returns the updated list.
    pub fn touch(&self, path: &Path) -> Vec<PathBuf> {
        let mut entries = self.list();
        entries.retain(|p| p != path);
        entries.insert(0, path.to_path_buf());
        entries.truncate(self.max);

        self.settings.set_json(RECENT_FILES_KEY, &entries);
        tracing::debug!(path = %path.display(), entries = entries.len(), "Touched recent file");
        entries
    }

    /// Recent paths, most recent first.
    ///
    /// Tolerates a stored list that predates a smaller bound or contains
    /// duplicates by normalizing on read.
    pub fn list(&self) -> Vec<PathBuf> {
        let stored: Vec<PathBuf> = self
            .settings
            .get_json(RECENT_FILES_KEY)
            .unwrap_or_default();

        let mut entries: Vec<PathBuf> = Vec::with_capacity(stored.len());
        for path in stored {
            if !entries.contains(&path) {
                entries.push(path);
            }
        }
        entries.truncate(self.max);
        entries
    }

    /// The file that was open when the previous session ended.
    pub fn last_file(&self) -> Option<PathBuf> {
        self.settings.get_json(LAST_FILE_KEY)
    }

    /// Remember `path` as the file to restore next time.
    pub fn set_last_file(&self, path: &Path) {
        self.settings.set_json(LAST_FILE_KEY, path);
    }

    /// Forget the last-file pointer (e.g. after the file disappeared).
    pub fn clear_last_file(&self) {
        self.settings.remove(LAST_FILE_KEY);
    }
}
