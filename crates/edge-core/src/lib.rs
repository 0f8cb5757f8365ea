//! Core abstractions for the storefront tenant data layer.
//!
//! This crate provides the fundamental types and traits:
//! - `TenantId` / `TenantResolver` - Which store a request belongs to
//! - `RequestContext` - Request facts a resolver may consult
//! - `RuntimeSide` - Server render pass vs. client runtime
//! - `DataCacheConfig` - Cache and fetch configuration

mod config;
mod context;
mod lifecycle;
mod tenant;

pub use config::*;
pub use context::*;
pub use lifecycle::*;
pub use tenant::*;
