//! # Named In-Memory Store
//!
//! The SDK keeps three independent maps keyed by configuration name: the
//! document cache, the schema store, and watcher bookkeeping. Each is a
//! [`Store`], so a cache write never contends with a schema load.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

/// Name-keyed map shared between the SDK and its watcher tasks.
///
/// Every method takes the lock, copies in or out, and releases it, so a
/// caller awaiting a fetch never holds an entry. Values come back as clones:
/// a cached document handed to a caller is detached from the cache. Clones
/// of the store itself see the same entries, which is how a [`crate::WatchHandle`]
/// removes its own bookkeeping after the SDK has moved on.
#[derive(Debug)]
pub struct Store<T: Clone + Send + Sync> {
    data: Arc<RwLock<HashMap<String, T>>>,
}

impl<T: Clone + Send + Sync> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<T: Clone + Send + Sync> Store<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert a value, returning the previous value if the name existed.
    pub fn insert(&self, name: &str, value: T) -> Option<T> {
        self.data.write().insert(name.to_string(), value)
    }

    /// Retrieve a value by name.
    pub fn get(&self, name: &str) -> Option<T> {
        self.data.read().get(name).cloned()
    }

    /// Remove a value by name. Missing names are a no-op.
    pub fn remove(&self, name: &str) -> Option<T> {
        self.data.write().remove(name)
    }

    /// Remove the entry for `name` only if `pred` accepts the current value.
    ///
    /// The check and the removal happen under one write lock.
    pub fn remove_if(&self, name: &str, pred: impl FnOnce(&T) -> bool) -> Option<T> {
        let mut guard = self.data.write();
        if guard.get(name).is_some_and(pred) {
            guard.remove(name)
        } else {
            None
        }
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.data.write().clear();
    }

    /// Remove and return every entry.
    pub fn drain(&self) -> Vec<(String, T)> {
        self.data.write().drain().collect()
    }

    /// Check if a name is present.
    pub fn contains(&self, name: &str) -> bool {
        self.data.read().contains_key(name)
    }

    /// Names currently present, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.data.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Return the number of entries.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone + Send + Sync> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}
