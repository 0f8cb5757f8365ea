//! Cache read metrics.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Counters for cached reads, shared across tasks.
#[derive(Debug, Default)]
pub struct CacheMetrics {
    hits: AtomicU64,
    misses: AtomicU64,
    revalidations: AtomicU64,
    not_modified: AtomicU64,
    refreshes: AtomicU64,
    failures: AtomicU64,
    timeouts: AtomicU64,
    missing_validators: AtomicU64,
}

impl CacheMetrics {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// A read served from a fresh entry.
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// A read that had to contact the origin.
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// A conditional request was sent.
    pub fn record_revalidation(&self) {
        self.revalidations.fetch_add(1, Ordering::Relaxed);
    }

    /// The origin answered `304 Not Modified`.
    pub fn record_not_modified(&self) {
        self.not_modified.fetch_add(1, Ordering::Relaxed);
    }

    /// A full payload was written to the store.
    pub fn record_refresh(&self) {
        self.refreshes.fetch_add(1, Ordering::Relaxed);
    }

    /// A read failed. `timed_out` additionally bumps the timeout counter.
    pub fn record_failure(&self, timed_out: bool) {
        self.failures.fetch_add(1, Ordering::Relaxed);
        if timed_out {
            self.timeouts.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// A payload arrived with neither `ETag` nor `Last-Modified`.
    pub fn record_missing_validators(&self) {
        self.missing_validators.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of every counter.
    pub fn snapshot(&self) -> CacheMetricsSnapshot {
        CacheMetricsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            revalidations: self.revalidations.load(Ordering::Relaxed),
            not_modified: self.not_modified.load(Ordering::Relaxed),
            refreshes: self.refreshes.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            missing_validators: self.missing_validators.load(Ordering::Relaxed),
        }
    }
}

/// Serializable counter values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheMetricsSnapshot {
    /// Reads served from a fresh entry.
    pub hits: u64,
    /// Reads that contacted the origin.
    pub misses: u64,
    /// Conditional requests sent.
    pub revalidations: u64,
    /// `304 Not Modified` replays.
    pub not_modified: u64,
    /// Full payloads written.
    pub refreshes: u64,
    /// Failed reads.
    pub failures: u64,
    /// Failed reads that hit the deadline.
    pub timeouts: u64,
    /// Payloads stored without validators.
    pub missing_validators: u64,
}

impl CacheMetricsSnapshot {
    /// Total reads observed.
    pub fn reads(&self) -> u64 {
        self.hits + self.misses
    }

    /// Fraction of reads served without a network call.
    pub fn hit_ratio(&self) -> f64 {
        match self.reads() {
            0 => 0.0,
            reads => self.hits as f64 / reads as f64,
        }
    }

    /// Format as JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
