//! The process-wide cache store.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use edge_core::DataCacheConfig;
use parking_lot::RwLock;
use serde_json::Value;

use crate::entry::CacheEntry;
use crate::events::{CacheEvent, Listeners, Subscription};

/// Key to entry map shared by every reader in the process.
///
/// Cloning the store clones a handle; all clones see the same entries. The
/// store has no notion of TTL: entries leave only through [`evict`], an
/// overwrite, or the optional capacity cap.
///
/// [`evict`]: CacheStore::evict
pub struct CacheStore<T = Value> {
    inner: Arc<StoreInner<T>>,
}

/// Outcome of making room for a new key.
enum Room {
    Free,
    Displaced(String),
    Full,
}

struct StoreInner<T> {
    entries: RwLock<HashMap<String, CacheEntry<T>>>,
    max_entries: Option<usize>,
    listeners: Listeners,
}

impl<T> Clone for CacheStore<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone> Default for CacheStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for CacheStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore")
            .field("len", &self.inner.entries.read().len())
            .field("max_entries", &self.inner.max_entries)
            .finish()
    }
}

impl<T: Clone> CacheStore<T> {
    /// Create an unbounded store.
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Create a store holding at most `max_entries` keys.
    ///
    /// Inserting a new key into a full store first removes the entry that was
    /// confirmed fresh longest ago.
    pub fn with_max_entries(max_entries: usize) -> Self {
        Self::build(Some(max_entries.max(1)))
    }

    /// Create a store sized by `config.max_entries`.
    pub fn from_config(config: &DataCacheConfig) -> Self {
        Self::build(config.max_entries.map(|n| n.max(1)))
    }

    fn build(max_entries: Option<usize>) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                entries: RwLock::new(HashMap::new()),
                max_entries,
                listeners: Listeners::default(),
            }),
        }
    }

    /// Capacity cap, if any.
    pub fn max_entries(&self) -> Option<usize> {
        self.inner.max_entries
    }

    /// Look up an entry. Freshness is the caller's concern.
    pub fn get(&self, key: &str) -> Option<CacheEntry<T>> {
        self.inner.entries.read().get(key).cloned()
    }

    /// Whether an entry exists for `key`.
    pub fn has(&self, key: &str) -> bool {
        self.inner.entries.read().contains_key(key)
    }

    /// Insert or fully replace the entry for `key`.
    ///
    /// In a full store a new key only goes in if its entry is newer than the
    /// oldest stored one, which is then dropped. Returns false when the entry
    /// was rejected for capacity.
    pub fn set(&self, key: impl Into<String>, entry: CacheEntry<T>) -> bool {
        let key = key.into();
        let displaced = {
            let mut entries = self.inner.entries.write();
            let displaced = if entries.contains_key(&key) {
                None
            } else {
                match self.make_room(&mut entries, entry.timestamp) {
                    Room::Free => None,
                    Room::Displaced(old) => Some(old),
                    Room::Full => {
                        tracing::debug!(key = %key, "cache at capacity, entry older than all stored entries");
                        return false;
                    }
                }
            };
            entries.insert(key.clone(), entry);
            displaced
        };

        if let Some(old) = displaced {
            self.notify(&CacheEvent::Evicted { keys: vec![old] });
        }
        self.notify(&CacheEvent::Stored { key });
        true
    }

    /// Record that the origin confirmed `key` unchanged at `now`.
    ///
    /// Only the timestamp moves; payload and validators stay as they were.
    /// Returns the stored payload, or `None` when there is no entry to confirm.
    pub fn confirm_fresh(&self, key: &str, now: DateTime<Utc>) -> Option<T> {
        let data = {
            let mut entries = self.inner.entries.write();
            let entry = entries.get_mut(key)?;
            entry.timestamp = now;
            entry.data.clone()
        };
        self.notify(&CacheEvent::Refreshed {
            key: key.to_string(),
        });
        Some(data)
    }

    /// Remove entries whose key contains `pattern`, or every entry when
    /// `pattern` is `None`. Returns how many entries were removed.
    pub fn evict(&self, pattern: Option<&str>) -> usize {
        let removed: Vec<String> = {
            let mut entries = self.inner.entries.write();
            match pattern {
                Some(pattern) => {
                    let keys: Vec<String> = entries
                        .keys()
                        .filter(|key| key.contains(pattern))
                        .cloned()
                        .collect();
                    for key in &keys {
                        entries.remove(key);
                    }
                    keys
                }
                None => entries.drain().map(|(key, _)| key).collect(),
            }
        };

        let count = removed.len();
        if count > 0 {
            tracing::info!(pattern = pattern.unwrap_or("*"), count, "evicted cache entries");
            self.notify(&CacheEvent::Evicted { keys: removed });
        }
        count
    }

    /// Remove every entry. Returns the prior size.
    pub fn clear(&self) -> usize {
        self.evict(None)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.inner.entries.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.entries.read().is_empty()
    }

    /// Current keys, in no particular order.
    pub fn keys(&self) -> Vec<String> {
        self.inner.entries.read().keys().cloned().collect()
    }

    /// Copy of every entry.
    pub fn snapshot(&self) -> HashMap<String, CacheEntry<T>> {
        self.inner.entries.read().clone()
    }

    /// Register a listener for cache events.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&CacheEvent) + Send + Sync + 'static,
    {
        self.inner.listeners.subscribe(Arc::new(listener))
    }

    /// Remove a listener. Returns false if it was already gone.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        self.inner.listeners.unsubscribe(subscription)
    }

    /// Insert every entry whose key is not already present, under a single
    /// write lock. In a full store an incoming entry never displaces a newer
    /// one. Returns `(inserted, skipped)`.
    pub(crate) fn merge_absent<I>(&self, incoming: I) -> (usize, usize)
    where
        I: IntoIterator<Item = (String, CacheEntry<T>)>,
    {
        let mut inserted = 0;
        let mut skipped = 0;
        let mut displaced = Vec::new();
        {
            let mut entries = self.inner.entries.write();
            for (key, entry) in incoming {
                if entries.contains_key(&key) {
                    skipped += 1;
                    continue;
                }
                match self.make_room(&mut entries, entry.timestamp) {
                    Room::Free => {}
                    Room::Displaced(old) => displaced.push(old),
                    Room::Full => {
                        skipped += 1;
                        continue;
                    }
                }
                entries.insert(key, entry);
                inserted += 1;
            }
        }

        if !displaced.is_empty() {
            self.notify(&CacheEvent::Evicted { keys: displaced });
        }
        (inserted, skipped)
    }

    pub(crate) fn notify(&self, event: &CacheEvent) {
        self.inner.listeners.notify(event);
    }

    fn make_room(&self, entries: &mut HashMap<String, CacheEntry<T>>, incoming: DateTime<Utc>) -> Room {
        let Some(max) = self.inner.max_entries else {
            return Room::Free;
        };
        if entries.len() < max {
            return Room::Free;
        }
        let Some((oldest, timestamp)) = entries
            .iter()
            .min_by_key(|(_, entry)| entry.timestamp)
            .map(|(key, entry)| (key.clone(), entry.timestamp))
        else {
            return Room::Free;
        };
        if incoming <= timestamp {
            return Room::Full;
        }
        entries.remove(&oldest);
        tracing::debug!(key = %oldest, max, "cache at capacity, dropped oldest entry");
        Room::Displaced(oldest)
    }
}
