//! Public SDK for the storefront tenant data layer.
//!
//! This crate re-exports all cache and fetch functionality:
//!
//! ```ignore
//! use edge_sdk::prelude::*;
//!
//! let config = DataCacheConfig::load("data-cache.toml")?;
//! init_logging_from_config(&config);
//!
//! let store: CacheStore = CacheStore::from_config(&config);
//! let client = FetchClient::from_config(&config, store.clone())?;
//!
//! let tenant = TenantId::new("acme");
//! let settings = client
//!     .read_resource(Resource::StoreConfig, &tenant, "/store/config")
//!     .await?;
//!
//! // End of the server render pass.
//! let snapshot = HydrationBridge::new(store, RuntimeSide::Server).dehydrate();
//! let tag = snapshot.to_script_tag("__DATA_CACHE__")?;
//! ```

pub use edge_cache;
pub use edge_core;
pub use edge_data;
pub use edge_observability;

/// Prelude for convenient imports.
pub mod prelude {
    pub use edge_cache::*;
    pub use edge_core::*;
    pub use edge_data::*;
    pub use edge_observability::*;
}
