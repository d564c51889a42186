//! Concurrent memoizing cache for per-string lookups.
//!
//! The extraction core is stateless across documents; the one shared mutable
//! utility at its boundary is this cache, intended for expensive per-string
//! lookups delegated to external classifiers (country or sector resolution).

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Memoizing key-value store with at-most-one computation per unique key.
///
/// The lock is held across the compute closure, so two threads asking for the
/// same missing key never both run it. There is no eviction; the working set
/// is bounded by the number of distinct strings seen in a document batch.
#[derive(Debug, Default)]
pub struct MemoCache<V> {
    entries: Mutex<HashMap<String, V>>,
}

impl<V: Clone> MemoCache<V> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached value for `key`, computing and storing it on a miss.
    pub fn get_or_compute<F>(&self, key: &str, compute: F) -> V
    where
        F: FnOnce(&str) -> V,
    {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(value) = entries.get(key) {
            return value.clone();
        }
        let value = compute(key);
        entries.insert(key.to_string(), value.clone());
        value
    }

    /// Return the cached value for `key` without computing anything.
    pub fn get(&self, key: &str) -> Option<V> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
