//! Common types used across tenantkit

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use time::OffsetDateTime;
use uuid::Uuid;

// =============================================================================
// ID Wrappers
// =============================================================================

/// Tenant ID wrapper
///
/// Tenant identifiers come from static configuration (e.g. "acme"), so they are
/// plain strings rather than generated UUIDs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(pub String);

impl TenantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TenantId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for TenantId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// =============================================================================
// Tenant
// =============================================================================

/// A tenant definition as loaded from configuration
///
/// Everything other than `id`, `name` and `hostnames` is collected into
/// `settings` and passed through untouched; the resolver never looks at it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    pub id: TenantId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Recognized hostnames, in configuration order
    pub hostnames: Vec<String>,
    #[serde(flatten)]
    pub settings: serde_json::Map<String, serde_json::Value>,
}

impl Tenant {
    pub fn new<I, S>(id: impl Into<TenantId>, hostnames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            name: None,
            hostnames: hostnames.into_iter().map(Into::into).collect(),
            settings: serde_json::Map::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_setting(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.settings.insert(key.into(), value);
        self
    }

    /// Name to show for this tenant, falling back to its ID
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.id.as_str())
    }

    /// Look up an opaque tenant setting
    pub fn setting(&self, key: &str) -> Option<&serde_json::Value> {
        self.settings.get(key)
    }

    /// Check whether `host` is one of this tenant's hostnames (case-insensitive)
    pub fn matches_host(&self, host: &str) -> bool {
        !host.is_empty() && self.hostnames.iter().any(|h| h.eq_ignore_ascii_case(host))
    }
}

// =============================================================================
// Tenant Context
// =============================================================================

/// The result of a successful tenant resolution
///
/// Created once per resolution and shared behind an `Arc` afterwards, so every
/// request served from the same cache entry sees the same `id`.
#[derive(Debug)]
pub struct TenantContext {
    id: Uuid,
    tenant: Arc<Tenant>,
    resolved_at: OffsetDateTime,
}

impl TenantContext {
    pub fn new(tenant: Arc<Tenant>) -> Self {
        Self {
            id: Uuid::new_v4(),
            tenant,
            resolved_at: OffsetDateTime::now_utc(),
        }
    }

    /// Unique ID of this resolution
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn tenant(&self) -> &Tenant {
        &self.tenant
    }

    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant.id
    }

    pub fn resolved_at(&self) -> OffsetDateTime {
        self.resolved_at
    }
}
