//! Tenant data reads with deadlines and conditional revalidation.
//!
//! This crate provides:
//! - `FetchClient` - Read-through cache over a shared `CacheStore`
//! - `DeadlineFetcher` - Per-request deadline with transfer cancellation
//! - `interpret_response` - Status/validator handling and cache write-back
//! - `Transport` / `ReqwestTransport` - The network seam
//! - `Resource` - Storefront resources with default TTLs and key shapes

mod client;
mod error;
mod interpret;
mod request;
mod resource;
mod response;
mod timeout;
mod transport;

#[cfg(test)]
mod testing;

pub use client::*;
pub use error::*;
pub use interpret::*;
pub use request::*;
pub use resource::*;
pub use response::*;
pub use timeout::*;
pub use transport::*;
