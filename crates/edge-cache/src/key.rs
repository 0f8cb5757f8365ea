//! Cache key composition.

use edge_core::TenantId;
use serde::{Deserialize, Serialize};

/// Separator between key components.
pub const KEY_SEPARATOR: char = '-';

/// A cache key identifying one logical resource for one tenant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    /// The computed key string.
    key: String,
    /// Components that make up the key (for debugging).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    components: Vec<String>,
}

impl CacheKey {
    /// Create a cache key from a string.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            components: Vec::new(),
        }
    }

    /// `"<resource>-<tenant>"`.
    pub fn tenant(resource: impl Into<String>, tenant: impl AsRef<str>) -> Self {
        CacheKeyBuilder::new(resource).tenant(tenant).build()
    }

    /// Start composing a key for `resource`.
    pub fn builder(resource: impl Into<String>) -> CacheKeyBuilder {
        CacheKeyBuilder::new(resource)
    }

    /// Get the key string.
    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// Get the key components (for debugging).
    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// Whether `pattern` would evict this key.
    pub fn matches(&self, pattern: &str) -> bool {
        self.key.contains(pattern)
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.key
    }
}

impl From<CacheKey> for String {
    fn from(key: CacheKey) -> Self {
        key.key
    }
}

/// Builder for composing cache keys.
#[derive(Debug, Clone)]
pub struct CacheKeyBuilder {
    components: Vec<String>,
}

impl CacheKeyBuilder {
    /// Start a key with its resource name.
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            components: vec![resource.into()],
        }
    }

    /// Scope the key to a tenant.
    pub fn tenant(self, tenant: impl AsRef<str>) -> Self {
        self.part(tenant.as_ref())
    }

    /// Append a free-form component (page number, locale, ...).
    pub fn part(mut self, part: impl Into<String>) -> Self {
        self.components.push(part.into());
        self
    }

    /// Build the key.
    pub fn build(self) -> CacheKey {
        let sep = KEY_SEPARATOR.to_string();
        CacheKey {
            key: self.components.join(&sep),
            components: self.components,
        }
    }
}

/// Pattern matching every key scoped to `tenant`, for use with `evict`.
pub fn tenant_pattern(tenant: &TenantId) -> String {
    format!("{KEY_SEPARATOR}{tenant}")
}
