//! Persisted key-value settings for mdpane.
//!
//! This crate decouples the session core from wherever the host keeps its
//! small pieces of persistent state ("last opened file", "recent files").
//! The core API is:
//!
//! - [`SettingsStore`]: object-safe key-value store over JSON values
//! - [`SettingsStoreExt`]: typed `get_json`/`set_json` helpers
//! - [`RecentFiles`]: bounded most-recently-used list plus last-file pointer
//!
//! # Implementations
//!
//! - [`MemorySettings`]: in-memory store (tests, ephemeral sessions)
//! - [`FileSettings`]: single JSON file on disk
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use std::sync::Arc;
//! use mdpane_state::{MemorySettings, RecentFiles};
//!
//! let recent = RecentFiles::new(Arc::new(MemorySettings::new()));
//! recent.touch(Path::new("notes.md"));
//! assert_eq!(recent.list(), vec![Path::new("notes.md").to_path_buf()]);
//! ```

mod ext;
mod file;
mod recent;

use std::collections::BTreeMap;
use std::sync::RwLock;

use serde_json::Value;

pub use ext::SettingsStoreExt;
pub use file::FileSettings;
pub use recent::{DEFAULT_MAX_RECENT, LAST_FILE_KEY, RECENT_FILES_KEY, RecentFiles};

/// Key-value persistence for session settings.
///
/// Values are JSON so that lists and strings round-trip without a custom
/// encoding. Writes are best-effort: a store that cannot persist logs the
/// failure and keeps serving the in-memory value.
pub trait SettingsStore: Send + Sync {
    /// Retrieve the value stored under `key`.
    fn get(&self, key: &str) -> Option<Value>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: Value);

    /// Remove `key`. Removing a missing key is a no-op.
    fn remove(&self, key: &str);
}

/// In-memory [`SettingsStore`].
///
/// Nothing survives the process. Used in tests and when no state directory
/// is available.
#[derive(Debug, Default)]
pub struct MemorySettings {
    values: RwLock<BTreeMap<String, Value>>,
}

impl MemorySettings {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.read().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) {
        if let Ok(mut values) = self.values.write() {
            values.insert(key.to_owned(), value);
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut values) = self.values.write() {
            values.remove(key);
        }
    }
}
