//! Tenant identity.
//!
//! Turning a request into a tenant is the job of a [`TenantResolver`]
//! supplied by the host application; this crate only fixes its shape.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::context::RequestContext;

/// Identifier of one storefront tenant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    /// Create a new tenant ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TenantId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TenantId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for TenantId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Resolves the tenant a request belongs to.
///
/// Returns `None` when the request cannot be attributed to a store (bare
/// platform domain, unknown host).
pub trait TenantResolver: Send + Sync {
    /// Resolve the tenant for a request.
    fn resolve_tenant(&self, ctx: &RequestContext) -> Option<TenantId>;
}

impl<F> TenantResolver for F
where
    F: Fn(&RequestContext) -> Option<TenantId> + Send + Sync,
{
    fn resolve_tenant(&self, ctx: &RequestContext) -> Option<TenantId> {
        self(ctx)
    }
}
