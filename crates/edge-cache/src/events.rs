//! Cache change notifications.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

/// A change applied to a [`CacheStore`](crate::CacheStore).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    /// A payload was written (new key or full replacement).
    Stored {
        /// Key that was written.
        key: String,
    },
    /// A `304 Not Modified` replay refreshed an entry's timestamp.
    Refreshed {
        /// Key that was refreshed.
        key: String,
    },
    /// Entries were removed by eviction or the capacity cap.
    Evicted {
        /// Keys that were removed.
        keys: Vec<String>,
    },
    /// A dehydrated snapshot was merged into the store.
    Hydrated {
        /// Entries inserted from the snapshot.
        inserted: usize,
        /// Snapshot entries discarded because the key was already present.
        skipped: usize,
    },
}

/// Callback invoked for each [`CacheEvent`].
pub type Listener = Arc<dyn Fn(&CacheEvent) + Send + Sync>;

/// Handle returned by `subscribe`; pass it back to `unsubscribe`.
#[must_use = "dropping a Subscription leaves the listener registered"]
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Subscription {
    id: u64,
}

impl Subscription {
    /// Registration order of this subscription.
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Ordered listener registry.
///
/// Listeners run in registration order, outside of the registry lock, so a
/// listener may read the store or unsubscribe itself.
#[derive(Default)]
pub(crate) struct Listeners {
    next_id: AtomicU64,
    listeners: Mutex<BTreeMap<u64, Listener>>,
}

impl Listeners {
    pub(crate) fn subscribe(&self, listener: Listener) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.lock().insert(id, listener);
        Subscription { id }
    }

    pub(crate) fn unsubscribe(&self, subscription: Subscription) -> bool {
        self.listeners.lock().remove(&subscription.id).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners.lock().len()
    }

    pub(crate) fn notify(&self, event: &CacheEvent) {
        let listeners: Vec<Listener> = self.listeners.lock().values().cloned().collect();
        for listener in listeners {
            listener(event);
        }
    }
}
