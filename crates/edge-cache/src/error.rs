//! Cache error types.

use thiserror::Error;

/// Errors moving a cache snapshot between server and client.
#[derive(Error, Debug)]
pub enum HydrationError {
    /// Snapshot could not be encoded.
    #[error("Failed to serialize cache snapshot: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Snapshot text was not a valid snapshot.
    #[error("Failed to parse cache snapshot: {0}")]
    Parse(#[source] serde_json::Error),
}
