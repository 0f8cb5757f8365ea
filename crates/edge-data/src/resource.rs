//! Storefront resources and their cache defaults.

use std::fmt;
use std::time::Duration;

use edge_cache::CacheKey;
use edge_core::TenantId;

use crate::client::ReadOptions;

/// Well-known tenant resources.
///
/// Each resource carries a default TTL and a key shape of
/// `"<resource>-<tenant>"`, so `evict(Some("-<tenant>"))` reaches all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    /// Store configuration (branding, locale, feature flags).
    StoreConfig,
    /// Category tree.
    Categories,
    /// Product listings.
    Products,
    /// Delivery areas and fees.
    DeliveryAreas,
    /// Enabled payment methods.
    PaymentMethods,
    /// Custom resource with name.
    Custom(&'static str),
}

impl Resource {
    /// Get the name of this resource.
    pub fn name(&self) -> &str {
        match self {
            Self::StoreConfig => "store-config",
            Self::Categories => "categories",
            Self::Products => "products",
            Self::DeliveryAreas => "delivery-areas",
            Self::PaymentMethods => "payment-methods",
            Self::Custom(name) => name,
        }
    }

    /// Get the default TTL for this resource.
    pub fn default_ttl(&self) -> Duration {
        match self {
            Self::StoreConfig => Duration::from_secs(10 * 60),
            Self::Categories => Duration::from_secs(5 * 60),
            Self::Products => Duration::from_secs(60), // Stock moves fast
            Self::DeliveryAreas => Duration::from_secs(15 * 60),
            Self::PaymentMethods => Duration::from_secs(10 * 60),
            Self::Custom(_) => Duration::from_secs(5 * 60),
        }
    }

    /// Cache key for this resource under `tenant`.
    pub fn cache_key(&self, tenant: &TenantId) -> CacheKey {
        CacheKey::tenant(self.name(), tenant)
    }

    /// Read options carrying this resource's default TTL.
    pub fn read_options(&self) -> ReadOptions {
        ReadOptions::new().ttl(self.default_ttl())
    }

    /// Message used when the origin's error body has none.
    pub fn default_error_message(&self) -> String {
        format!("Failed to load {}", self.name())
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edge_cache::tenant_pattern;

    #[test]
    fn test_resource_names() {
        assert_eq!(Resource::StoreConfig.name(), "store-config");
        assert_eq!(Resource::DeliveryAreas.to_string(), "delivery-areas");
        assert_eq!(Resource::Custom("banners").name(), "banners");
    }

    #[test]
    fn test_default_ttls() {
        assert_eq!(Resource::StoreConfig.default_ttl(), Duration::from_secs(600));
        assert!(Resource::Products.default_ttl() < Resource::Categories.default_ttl());
        assert_eq!(Resource::Custom("x").read_options().ttl, Some(Duration::from_secs(300)));
    }

    #[test]
    fn test_cache_key_scoped_to_tenant() {
        let acme = TenantId::new("acme");
        let key = Resource::StoreConfig.cache_key(&acme);
        assert_eq!(key.as_str(), "store-config-acme");
        assert!(key.matches(&tenant_pattern(&acme)));
        assert!(!Resource::Categories
            .cache_key(&TenantId::new("globex"))
            .matches(&tenant_pattern(&acme)));
    }
}
