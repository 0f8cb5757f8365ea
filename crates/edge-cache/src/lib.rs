//! In-process tenant data cache for the storefront.
//!
//! This crate provides:
//! - `CacheStore` - Process-wide key to entry map with pattern eviction
//! - `CacheEntry` / `Validators` - Payload plus `ETag` / `Last-Modified`
//! - `ReadPolicy` - TTL freshness evaluation
//! - `CacheKey` - `"<resource>-<tenant>"` key composition
//! - `HydrationBridge` / `DehydratedCache` - Server to client cache handoff
//! - `CacheEvent` / `Subscription` - Observer list for cache changes
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use edge_cache::{CacheEntry, CacheKey, CacheStore, ReadPolicy, Validators};
//!
//! let store: CacheStore = CacheStore::new();
//! let key = CacheKey::tenant("store-config", "acme");
//! store.set(key.as_str(), CacheEntry::now(serde_json::json!({"title": "Acme"}), Validators::etag("\"v1\"")));
//!
//! let policy = ReadPolicy::new(Duration::from_secs(600));
//! let entry = store.get(key.as_str()).unwrap();
//! assert!(policy.is_fresh(&entry));
//! ```

mod entry;
mod error;
mod events;
mod hydration;
mod key;
mod policy;
mod status;
mod store;

pub use entry::*;
pub use error::*;
pub use events::*;
pub use hydration::*;
pub use key::*;
pub use policy::*;
pub use status::*;
pub use store::*;
