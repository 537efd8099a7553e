//! File-based settings implementation.
//!
//! [`FileSettings`] keeps every key in one JSON object on disk:
//!
//! ```text
//! {state_dir}/
//! +-- state.json     # {"lastFile": "...", "recentFiles": ["...", ...]}
//! ```
//!
//! The file is read once on construction. Every `set`/`remove` rewrites the
//! whole object through a temporary file and a rename, so a crash mid-write
//! never leaves a truncated `state.json` behind. Errors are logged but never
//! fatal; the in-memory map stays authoritative for the running process.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde_json::Value;

use crate::SettingsStore;

/// Name of the state file inside the state directory.
const STATE_FILENAME: &str = "state.json";

/// [`SettingsStore`] persisted as a JSON file in a state directory.
pub struct FileSettings {
    path: PathBuf,
    values: RwLock<BTreeMap<String, Value>>,
}

impl FileSettings {
    /// Open (or lazily create) the settings file inside `state_dir`.
    ///
    /// A missing or unreadable file starts an empty store; a corrupt file is
    /// logged and ignored.
    #[must_use]
    pub fn new(state_dir: &Path) -> Self {
        let path = state_dir.join(STATE_FILENAME);
        let values = load_values(&path);
        Self {
            path,
            values: RwLock::new(values),
        }
    }

    /// Location of the backing JSON file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &BTreeMap<String, Value>) {
        let Some(parent) = self.path.parent() else {
            return;
        };
        if let Err(e) = fs::create_dir_all(parent) {
            tracing::warn!(path = %parent.display(), "failed to create state directory: {e}");
            return;
        }

        let bytes = match serde_json::to_vec_pretty(values) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("failed to serialize settings: {e}");
                return;
            }
        };

        let tmp = self.path.with_extension("json.tmp");
        if let Err(e) = fs::write(&tmp, &bytes).and_then(|()| fs::rename(&tmp, &self.path)) {
            tracing::warn!(path = %self.path.display(), "failed to write settings: {e}");
        }
    }
}

impl SettingsStore for FileSettings {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.read().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) {
        let Ok(mut values) = self.values.write() else {
            return;
        };
        values.insert(key.to_owned(), value);
        self.persist(&values);
    }

    fn remove(&self, key: &str) {
        let Ok(mut values) = self.values.write() else {
            return;
        };
        if values.remove(key).is_some() {
            self.persist(&values);
        }
    }
}

/// Read the settings map, falling back to empty on any problem.
fn load_values(path: &Path) -> BTreeMap<String, Value> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no settings file, starting empty");
            return BTreeMap::new();
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), "failed to read settings: {e}");
            return BTreeMap::new();
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(values) => values,
        Err(e) => {
            tracing::warn!(path = %path.display(), "ignoring corrupt settings file: {e}");
            BTreeMap::new()
        }
    }
}
