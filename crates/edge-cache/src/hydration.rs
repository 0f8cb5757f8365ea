//! Server to client cache handoff.
//!
//! At the end of a server render the store is dehydrated into a plain map and
//! shipped with the page. When the client runtime starts it hydrates its own
//! store from that map, so the first client-side read of data the server just
//! fetched is a fresh hit instead of a second round trip.
//!
//! Hydration never overwrites: a key the client already holds was fetched
//! after the server snapshot was taken and is at least as fresh.

use std::collections::HashMap;

use edge_core::RuntimeSide;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entry::CacheEntry;
use crate::error::HydrationError;
use crate::events::CacheEvent;
use crate::store::CacheStore;

/// Plain key to entry map captured from a store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DehydratedCache<T = Value> {
    entries: HashMap<String, CacheEntry<T>>,
}

impl<T> Default for DehydratedCache<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<T> DehydratedCache<T> {
    /// An empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing map.
    pub fn from_entries(entries: HashMap<String, CacheEntry<T>>) -> Self {
        Self { entries }
    }

    /// Add an entry.
    pub fn insert(&mut self, key: impl Into<String>, entry: CacheEntry<T>) {
        self.entries.insert(key.into(), entry);
    }

    /// Look up an entry.
    pub fn get(&self, key: &str) -> Option<&CacheEntry<T>> {
        self.entries.get(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Borrow the entries.
    pub fn entries(&self) -> &HashMap<String, CacheEntry<T>> {
        &self.entries
    }

    /// Take the entries.
    pub fn into_entries(self) -> HashMap<String, CacheEntry<T>> {
        self.entries
    }
}

impl<T: Serialize> DehydratedCache<T> {
    /// Encode as JSON.
    pub fn to_json(&self) -> Result<String, HydrationError> {
        serde_json::to_string(self).map_err(HydrationError::Serialize)
    }

    /// Encode as a `<script type="application/json">` element for embedding
    /// in server-rendered HTML.
    ///
    /// `<`, `>` and `&` inside the JSON are written as unicode escapes so the
    /// payload cannot close the element or open a comment.
    pub fn to_script_tag(&self, element_id: &str) -> Result<String, HydrationError> {
        let json = self.to_json()?;
        Ok(format!(
            r#"<script type="application/json" id="{}">{}</script>"#,
            escape_attribute(element_id),
            escape_script_json(&json)
        ))
    }
}

impl<T: DeserializeOwned> DehydratedCache<T> {
    /// Decode from JSON produced by [`to_json`](Self::to_json).
    pub fn from_json(json: &str) -> Result<Self, HydrationError> {
        serde_json::from_str(json).map_err(HydrationError::Parse)
    }
}

fn escape_script_json(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        match c {
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            _ => out.push(c),
        }
    }
    out
}

fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}

/// Moves cache state between the server render pass and the client runtime.
pub struct HydrationBridge<T = Value> {
    store: CacheStore<T>,
    side: RuntimeSide,
}

impl<T: Clone> HydrationBridge<T> {
    /// Create a bridge for an explicit runtime side.
    pub fn new(store: CacheStore<T>, side: RuntimeSide) -> Self {
        Self { store, side }
    }

    /// Create a bridge for the side this binary was compiled for.
    pub fn for_current_runtime(store: CacheStore<T>) -> Self {
        Self::new(store, RuntimeSide::current())
    }

    /// The runtime side this bridge acts for.
    pub fn side(&self) -> RuntimeSide {
        self.side
    }

    /// The store this bridge reads from and writes into.
    pub fn store(&self) -> &CacheStore<T> {
        &self.store
    }

    /// Capture every entry in the store.
    ///
    /// Only meaningful on the server; on the client this returns an empty
    /// snapshot.
    pub fn dehydrate(&self) -> DehydratedCache<T> {
        if self.side.is_client() {
            tracing::debug!("dehydrate called on client runtime, returning empty snapshot");
            return DehydratedCache::new();
        }

        let snapshot = DehydratedCache::from_entries(self.store.snapshot());
        tracing::debug!(entries = snapshot.len(), "dehydrated cache");
        snapshot
    }

    /// Merge a server snapshot into the client store.
    ///
    /// Keys already present in the store are left untouched. Safe to call more
    /// than once and concurrently with reads. A no-op on the server or when the
    /// snapshot is absent or empty. Returns the number of entries inserted.
    pub fn hydrate(&self, snapshot: Option<DehydratedCache<T>>) -> usize {
        if self.side.is_server() {
            tracing::debug!("hydrate called on server runtime, ignoring snapshot");
            return 0;
        }

        let Some(snapshot) = snapshot.filter(|s| !s.is_empty()) else {
            return 0;
        };

        let (inserted, skipped) = self.store.merge_absent(snapshot.into_entries());
        tracing::debug!(inserted, skipped, "hydrated cache");
        self.store.notify(&CacheEvent::Hydrated { inserted, skipped });
        inserted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Validators;
    use std::sync::Arc;

    use chrono::{TimeDelta, Utc};
    use parking_lot::Mutex;
    use serde_json::json;

    fn entry(data: Value) -> CacheEntry<Value> {
        CacheEntry::now(data, Validators::etag("\"v1\""))
    }

    fn server_store() -> CacheStore {
        let store = CacheStore::new();
        store.set("store-config-acme", entry(json!({"title": "Acme"})));
        store.set("categories-acme", entry(json!(["shoes", "hats"])));
        store
    }

    // === Dehydrate ===

    #[test]
    fn test_dehydrate_captures_all_entries() {
        let bridge = HydrationBridge::new(server_store(), RuntimeSide::Server);
        let snapshot = bridge.dehydrate();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get("store-config-acme").unwrap().data["title"], "Acme");
    }

    #[test]
    fn test_dehydrate_on_client_is_empty() {
        let bridge = HydrationBridge::new(server_store(), RuntimeSide::Client);
        assert!(bridge.dehydrate().is_empty());
    }

    // === Hydrate ===

    #[test]
    fn test_hydrate_fills_gaps() {
        let snapshot = HydrationBridge::new(server_store(), RuntimeSide::Server).dehydrate();

        let client = CacheStore::new();
        let bridge = HydrationBridge::new(client.clone(), RuntimeSide::Client);
        assert_eq!(bridge.hydrate(Some(snapshot.clone())), 2);
        assert_eq!(client.get("store-config-acme"), snapshot.get("store-config-acme").cloned());
    }

    #[test]
    fn test_hydrate_does_not_clobber_client_entries() {
        let client = CacheStore::new();
        client.set("k", entry(json!("Y")));

        let mut snapshot = DehydratedCache::new();
        snapshot.insert("k", entry(json!("Z")));
        snapshot.insert("other", entry(json!("W")));

        let bridge = HydrationBridge::new(client.clone(), RuntimeSide::Client);
        assert_eq!(bridge.hydrate(Some(snapshot)), 1);
        assert_eq!(client.get("k").unwrap().data, json!("Y"));
        assert_eq!(client.get("other").unwrap().data, json!("W"));
    }

    #[test]
    fn test_hydrate_is_idempotent() {
        let snapshot = HydrationBridge::new(server_store(), RuntimeSide::Server).dehydrate();
        let bridge = HydrationBridge::new(CacheStore::new(), RuntimeSide::Client);
        assert_eq!(bridge.hydrate(Some(snapshot.clone())), 2);
        assert_eq!(bridge.hydrate(Some(snapshot)), 0);
        assert_eq!(bridge.store().len(), 2);
    }

    #[test]
    fn test_hydrate_into_full_store_keeps_newer_client_entries() {
        let client: CacheStore = CacheStore::with_max_entries(1);
        client.set("client-fetched", entry(json!("fresh")));
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let _sub = client.subscribe(move |event| sink.lock().push(event.clone()));

        let mut snapshot = DehydratedCache::new();
        snapshot.insert(
            "server-old",
            CacheEntry::new(json!("stale"), Validators::none(), Utc::now() - TimeDelta::minutes(30)),
        );

        let bridge = HydrationBridge::new(client.clone(), RuntimeSide::Client);
        assert_eq!(bridge.hydrate(Some(snapshot)), 0);
        assert!(client.has("client-fetched"));
        assert!(!client.has("server-old"));
        assert_eq!(
            *events.lock(),
            vec![CacheEvent::Hydrated {
                inserted: 0,
                skipped: 1
            }]
        );
    }

    #[test]
    fn test_hydrate_into_full_store_replaces_older_entries() {
        let client: CacheStore = CacheStore::with_max_entries(1);
        client.set(
            "ancient",
            CacheEntry::new(json!("old"), Validators::none(), Utc::now() - TimeDelta::hours(2)),
        );

        let mut snapshot = DehydratedCache::new();
        snapshot.insert("store-config-acme", entry(json!({"title": "Acme"})));

        let bridge = HydrationBridge::new(client.clone(), RuntimeSide::Client);
        assert_eq!(bridge.hydrate(Some(snapshot)), 1);
        assert!(!client.has("ancient"));
        assert!(client.has("store-config-acme"));
    }

    #[test]
    fn test_hydrate_noops() {
        let server = HydrationBridge::new(CacheStore::new(), RuntimeSide::Server);
        let snapshot = HydrationBridge::new(server_store(), RuntimeSide::Server).dehydrate();
        assert_eq!(server.hydrate(Some(snapshot)), 0);
        assert!(server.store().is_empty());

        let client: HydrationBridge = HydrationBridge::new(CacheStore::new(), RuntimeSide::Client);
        assert_eq!(client.hydrate(None), 0);
        assert_eq!(client.hydrate(Some(DehydratedCache::new())), 0);
    }

    #[test]
    fn test_hydrate_preserves_entry_verbatim() {
        let stamped = Utc::now() - TimeDelta::minutes(3);
        let mut snapshot = DehydratedCache::new();
        snapshot.insert(
            "k",
            CacheEntry::new(
                json!(1),
                Validators::etag("\"a\"").with_last_modified("Tue, 01 Jan 2030 00:00:00 GMT"),
                stamped,
            ),
        );

        let bridge = HydrationBridge::new(CacheStore::new(), RuntimeSide::Client);
        bridge.hydrate(Some(snapshot));

        let stored = bridge.store().get("k").unwrap();
        assert_eq!(stored.timestamp, stamped);
        assert_eq!(stored.etag.as_deref(), Some("\"a\""));
        assert_eq!(stored.last_modified.as_deref(), Some("Tue, 01 Jan 2030 00:00:00 GMT"));
    }

    // === Transport ===

    #[test]
    fn test_json_round_trip_through_text() {
        let snapshot = HydrationBridge::new(server_store(), RuntimeSide::Server).dehydrate();
        let text = snapshot.to_json().unwrap();
        let parsed: DehydratedCache = DehydratedCache::from_json(&text).unwrap();
        assert_eq!(parsed, snapshot);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let result: Result<DehydratedCache, _> = DehydratedCache::from_json("[1,2,3]");
        assert!(matches!(result, Err(HydrationError::Parse(_))));
    }

    #[test]
    fn test_script_tag_escapes_markup() {
        let mut snapshot = DehydratedCache::new();
        snapshot.insert("k", entry(json!({"bio": "</script><b>&"})));

        let tag = snapshot.to_script_tag("edge-cache\"x").unwrap();
        assert!(tag.starts_with(r#"<script type="application/json" id="edge-cache&quot;x">"#));
        assert!(tag.ends_with("</script>"));
        assert_eq!(tag.matches("</script>").count(), 1);

        let body = tag
            .trim_start_matches(r#"<script type="application/json" id="edge-cache&quot;x">"#)
            .trim_end_matches("</script>");
        let parsed: DehydratedCache = DehydratedCache::from_json(body).unwrap();
        assert_eq!(parsed.get("k").unwrap().data["bio"], "</script><b>&");
    }
}
