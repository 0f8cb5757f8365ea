//! Data cache configuration.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default time-to-live for cached reads.
pub const DEFAULT_TTL_SECS: u64 = 300;

/// Default deadline for a single outbound request.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Configuration for the tenant data cache and its fetcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataCacheConfig {
    /// Prefix joined onto relative read URLs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,

    /// TTL applied when a read does not supply its own.
    #[serde(default = "default_ttl_secs")]
    pub default_ttl_secs: u64,

    /// Deadline for each outbound request.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Optional cap on the number of cached entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_entries: Option<usize>,

    /// Log output format.
    #[serde(default)]
    pub log_format: LogFormat,

    /// `EnvFilter` directive for log output.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_ttl_secs() -> u64 {
    DEFAULT_TTL_SECS
}

fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

fn default_log_filter() -> String {
    "info".to_string()
}

/// Output format for logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON lines (for production/log aggregation).
    #[default]
    Json,
    /// Human-readable (for development).
    Human,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Human => write!(f, "human"),
        }
    }
}

impl Default for DataCacheConfig {
    fn default() -> Self {
        Self {
            api_base_url: None,
            default_ttl_secs: DEFAULT_TTL_SECS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            max_entries: None,
            log_format: LogFormat::default(),
            log_filter: default_log_filter(),
        }
    }
}

impl DataCacheConfig {
    /// Load config from a TOML or JSON file (chosen by extension).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
        }
    }

    /// TTL applied when a read does not supply its own.
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_secs)
    }

    /// Deadline for each outbound request.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
