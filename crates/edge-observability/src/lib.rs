//! Logging and cache metrics for the storefront tenant data layer.
//!
//! This crate provides:
//! - `init_logging` / `LogFormat` - `tracing` subscriber setup
//! - `CacheMetrics` - Lock-free hit/miss/revalidation counters

mod logging;
mod metrics;

pub use logging::*;
pub use metrics::*;
