//! Read freshness policy.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entry::CacheEntry;

/// Default TTL for cached reads.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// TTL applied to one read.
///
/// The TTL only decides whether to skip the network. Once it lapses the origin
/// decides, through conditional validators, whether the payload changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadPolicy {
    /// Time-to-live for entries read under this policy.
    pub ttl: Duration,
}

impl Default for ReadPolicy {
    fn default() -> Self {
        Self { ttl: DEFAULT_TTL }
    }
}

impl ReadPolicy {
    /// Create a policy with the given TTL.
    pub fn new(ttl: Duration) -> Self {
        Self { ttl }
    }

    /// A policy under which nothing is fresh; every read goes to the origin.
    pub fn always_revalidate() -> Self {
        Self { ttl: Duration::ZERO }
    }

    /// Whether `entry` can be served without contacting the origin.
    pub fn is_fresh<T>(&self, entry: &CacheEntry<T>) -> bool {
        self.is_fresh_at(entry, Utc::now())
    }

    /// Same as [`is_fresh`](Self::is_fresh) at an explicit instant.
    pub fn is_fresh_at<T>(&self, entry: &CacheEntry<T>, now: DateTime<Utc>) -> bool {
        entry.is_fresh_at(self.ttl, now)
    }

    /// Time left before `entry` goes stale.
    pub fn remaining_ttl<T>(&self, entry: &CacheEntry<T>) -> Duration {
        self.ttl.saturating_sub(entry.age_at(Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Validators;
    use chrono::TimeDelta;

    #[test]
    fn test_default_ttl() {
        assert_eq!(ReadPolicy::default().ttl, Duration::from_secs(300));
    }

    #[test]
    fn test_always_revalidate_is_never_fresh() {
        let entry = CacheEntry::now((), Validators::none());
        assert!(!ReadPolicy::always_revalidate().is_fresh(&entry));
    }

    #[test]
    fn test_stale_after_ttl() {
        let policy = ReadPolicy::new(Duration::from_secs(600));
        let now = Utc::now();
        let recent = CacheEntry::new((), Validators::none(), now - TimeDelta::seconds(1));
        let old = CacheEntry::new((), Validators::none(), now - TimeDelta::minutes(11));
        assert!(policy.is_fresh_at(&recent, now));
        assert!(!policy.is_fresh_at(&old, now));
        assert_eq!(policy.remaining_ttl(&old), Duration::ZERO);
    }
}
