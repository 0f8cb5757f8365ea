//! Cache entries and their HTTP validators.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `ETag` / `Last-Modified` pair surfaced by the origin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Validators {
    /// Opaque entity tag, stored verbatim (quotes included).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    /// HTTP date string, stored verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
}

impl Validators {
    /// No validators.
    pub fn none() -> Self {
        Self::default()
    }

    /// Only an entity tag.
    pub fn etag(etag: impl Into<String>) -> Self {
        Self {
            etag: Some(etag.into()),
            last_modified: None,
        }
    }

    /// Only a last-modified date.
    pub fn last_modified(last_modified: impl Into<String>) -> Self {
        Self {
            etag: None,
            last_modified: Some(last_modified.into()),
        }
    }

    /// Set the last-modified date.
    pub fn with_last_modified(mut self, last_modified: impl Into<String>) -> Self {
        self.last_modified = Some(last_modified.into());
        self
    }

    /// True when neither validator is present.
    pub fn is_empty(&self) -> bool {
        self.etag.is_none() && self.last_modified.is_none()
    }
}

/// One cached payload.
///
/// `timestamp` is the last time the origin confirmed the payload, either by
/// sending it or by answering `304 Not Modified`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<T> {
    /// The decoded payload. Never inspected by the cache.
    pub data: T,
    /// Entity tag from the last full response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    /// Last-Modified from the last full response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    /// When the payload was last confirmed fresh.
    pub timestamp: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    /// Create an entry confirmed at `timestamp`.
    pub fn new(data: T, validators: Validators, timestamp: DateTime<Utc>) -> Self {
        Self {
            data,
            etag: validators.etag,
            last_modified: validators.last_modified,
            timestamp,
        }
    }

    /// Create an entry confirmed now.
    pub fn now(data: T, validators: Validators) -> Self {
        Self::new(data, validators, Utc::now())
    }

    /// The validators this entry can replay.
    pub fn validators(&self) -> Validators {
        Validators {
            etag: self.etag.clone(),
            last_modified: self.last_modified.clone(),
        }
    }

    /// Whether a conditional request can be built from this entry.
    pub fn can_revalidate(&self) -> bool {
        self.etag.is_some() || self.last_modified.is_some()
    }

    /// Age relative to `now`. A timestamp in the future counts as zero age.
    pub fn age_at(&self, now: DateTime<Utc>) -> Duration {
        now.signed_duration_since(self.timestamp)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }

    /// Whether the entry is younger than `ttl` at `now`.
    pub fn is_fresh_at(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        self.age_at(now) < ttl
    }
}
