//! Rendered diagram caching.
//!
//! - [`DiagramKey`]: content hash of everything that affects the output
//! - [`DiagramCache`]: trait for cache implementations
//! - [`NullCache`]: no-op cache (caching disabled)
//! - [`MemoryCache`]: bounded process-local cache shared by every render pass
//!
//! Only successful renders are stored; a failed diagram is retried on the
//! next pass.

use std::collections::{HashMap, VecDeque};
use std::sync::RwLock;

use sha2::{Digest, Sha256};

use crate::consts::DEFAULT_CACHE_ENTRIES;

/// Diagram parameters for cache key computation.
#[derive(Debug, Clone, Copy)]
pub struct DiagramKey<'a> {
    /// Diagram source code.
    pub source: &'a str,
    /// Kroki endpoint (e.g., "mermaid").
    pub endpoint: &'a str,
    /// Output format ("svg").
    pub format: &'a str,
}

impl DiagramKey<'_> {
    /// Compute a content hash for this diagram key.
    ///
    /// SHA-256 of `"{endpoint}:{format}:{source}"`, hex encoded.
    #[must_use]
    pub fn compute_hash(&self) -> String {
        let content = format!("{}:{}:{}", self.endpoint, self.format, self.source);
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Trait for diagram caching implementations.
///
/// Implementations must be thread-safe: renders of one pass run concurrently.
pub trait DiagramCache: Send + Sync {
    /// Retrieve a cached diagram.
    fn get(&self, key: DiagramKey<'_>) -> Option<String>;

    /// Store a rendered diagram.
    fn set(&self, key: DiagramKey<'_>, content: &str);
}

/// No-op cache implementation.
#[derive(Debug, Default)]
pub struct NullCache;

impl DiagramCache for NullCache {
    fn get(&self, _key: DiagramKey<'_>) -> Option<String> {
        None
    }

    fn set(&self, _key: DiagramKey<'_>, _content: &str) {}
}

/// In-memory cache keyed by [`DiagramKey::compute_hash`].
///
/// Holds at most `capacity` diagrams. Inserting past that evicts the entry
/// stored first.
#[derive(Debug)]
pub struct MemoryCache {
    capacity: usize,
    entries: RwLock<Entries>,
}

#[derive(Debug, Default)]
struct Entries {
    values: HashMap<String, String>,
    order: VecDeque<String>,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CACHE_ENTRIES)
    }
}

impl MemoryCache {
    /// Create an empty cache holding [`DEFAULT_CACHE_ENTRIES`] diagrams.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty cache holding at most `capacity` diagrams (minimum 1).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: RwLock::default(),
        }
    }

    /// Number of cached diagrams.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .map(|e| e.values.len())
            .unwrap_or_default()
    }

    /// Whether the cache holds no diagrams.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagramCache for MemoryCache {
    fn get(&self, key: DiagramKey<'_>) -> Option<String> {
        self.entries
            .read()
            .ok()?
            .values
            .get(&key.compute_hash())
            .cloned()
    }

    fn set(&self, key: DiagramKey<'_>, content: &str) {
        let Ok(mut entries) = self.entries.write() else {
            return;
        };
        let hash = key.compute_hash();
        if entries
            .values
            .insert(hash.clone(), content.to_owned())
            .is_some()
        {
            return;
        }
        entries.order.push_back(hash);
        while entries.order.len() > self.capacity {
            if let Some(oldest) = entries.order.pop_front() {
                entries.values.remove(&oldest);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn make_key<'a>(source: &'a str, format: &'a str) -> DiagramKey<'a> {
        DiagramKey {
            source,
            endpoint: "mermaid",
            format,
        }
    }

    #[test]
    fn test_diagram_key_hash() {
        let key1 = make_key("graph TD\nA-->B", "svg");
        let key2 = make_key("graph TD\nA-->B", "svg");
        let key3 = make_key("graph TD\nC-->D", "svg");

        assert_eq!(key1.compute_hash(), key2.compute_hash());
        assert_ne!(key1.compute_hash(), key3.compute_hash());
        assert_eq!(key1.compute_hash().len(), 64);
        assert!(key1.compute_hash().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_diagram_key_hash_format_matters() {
        let key_svg = make_key("source", "svg");
        let key_png = DiagramKey {
            format: "png",
            ..key_svg
        };

        assert_ne!(key_svg.compute_hash(), key_png.compute_hash());
    }

    #[test]
    fn test_null_cache() {
        let cache = NullCache;
        cache.set(make_key("pie", "svg"), "<svg/>");
        assert_eq!(cache.get(make_key("pie", "svg")), None);
    }

    #[test]
    fn test_memory_cache_get_set() {
        let cache = MemoryCache::new();
        assert!(cache.is_empty());

        cache.set(make_key("pie", "svg"), "<svg>pie</svg>");

        assert_eq!(
            cache.get(make_key("pie", "svg")),
            Some("<svg>pie</svg>".to_owned())
        );
        assert_eq!(cache.get(make_key("graph", "svg")), None);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_memory_cache_evicts_oldest() {
        let cache = MemoryCache::with_capacity(2);
        cache.set(make_key("a", "svg"), "A");
        cache.set(make_key("b", "svg"), "B");
        cache.set(make_key("c", "svg"), "C");

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(make_key("a", "svg")), None);
        assert_eq!(cache.get(make_key("b", "svg")), Some("B".to_owned()));
        assert_eq!(cache.get(make_key("c", "svg")), Some("C".to_owned()));
    }

    #[test]
    fn test_memory_cache_overwrite_keeps_slot() {
        let cache = MemoryCache::with_capacity(2);
        cache.set(make_key("a", "svg"), "A");
        cache.set(make_key("a", "svg"), "A2");
        cache.set(make_key("b", "svg"), "B");

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(make_key("a", "svg")), Some("A2".to_owned()));
    }

    #[test]
    fn test_memory_cache_overwrite() {
        let cache = MemoryCache::new();
        cache.set(make_key("pie", "svg"), "old");
        cache.set(make_key("pie", "svg"), "new");

        assert_eq!(cache.get(make_key("pie", "svg")), Some("new".to_owned()));
        assert_eq!(cache.len(), 1);
    }
}
