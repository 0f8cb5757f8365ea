//! Outcome of a cached read.

use serde::{Deserialize, Serialize};

/// How a read was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheStatus {
    /// Fresh hit, no network call.
    Hit,
    /// No entry; full fetch.
    Miss,
    /// Stale entry confirmed by `304 Not Modified`.
    NotModified,
    /// Stale entry replaced by a new payload.
    Refreshed,
    /// Read did not touch the cache.
    Bypass,
}

impl CacheStatus {
    /// Whether the read went to the network.
    pub fn used_network(&self) -> bool {
        !matches!(self, Self::Hit)
    }
}

impl std::fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hit => write!(f, "HIT"),
            Self::Miss => write!(f, "MISS"),
            Self::NotModified => write!(f, "NOT_MODIFIED"),
            Self::Refreshed => write!(f, "REFRESHED"),
            Self::Bypass => write!(f, "BYPASS"),
        }
    }
}
