//! Extension trait for [`SettingsStore`] with typed convenience methods.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::SettingsStore;

/// Typed convenience methods for [`SettingsStore`].
///
/// Provides `get_json`/`set_json` for serde types. These are implemented
/// as default methods on an extension trait so that:
///
/// - [`SettingsStore`] stays object-safe
/// - Implementors only need to handle raw JSON values
/// - Callers get ergonomic typed access via a blanket impl
///
/// # Example
///
/// ```
/// use mdpane_state::{MemorySettings, SettingsStoreExt};
///
/// let store = MemorySettings::new();
/// store.set_json("recentFiles", &vec!["a.md", "b.md"]);
/// let recent: Option<Vec<String>> = store.get_json("recentFiles");
/// assert_eq!(recent.unwrap().len(), 2);
/// ```
pub trait SettingsStoreExt: SettingsStore {
    /// Retrieve and deserialize the value under `key`.
    ///
    /// Returns `None` when the key is missing or holds a value of another shape.
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get(key)?;
        match serde_json::from_value(value) {
            Ok(typed) => Some(typed),
            Err(e) => {
                tracing::warn!(key, error = %e, "Ignoring malformed setting");
                None
            }
        }
    }

    /// Serialize and store `value` under `key`.
    ///
    /// Silently does nothing if serialization fails.
    fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        match serde_json::to_value(value) {
            Ok(json) => self.set(key, json),
            Err(e) => tracing::warn!(key, error = %e, "Failed to serialize setting"),
        }
    }
}

impl<S: SettingsStore + ?Sized> SettingsStoreExt for S {}
