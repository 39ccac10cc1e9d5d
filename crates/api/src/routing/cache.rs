//! In-memory tenant cache with absolute TTL
//!
//! Caches host-to-tenant lookups so repeated requests for the same host skip
//! the registry scan. Entries expire a fixed time after insertion; reading an
//! entry never extends its lifetime.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use tenantkit_shared::{TenantContext, TenantId};

use super::clock::{Clock, SystemClock};

/// Default cache TTL (30 minutes)
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(30 * 60);

/// Cache entry with expiration
#[derive(Clone)]
struct CacheEntry {
    /// None means the host was cached as not resolving
    context: Option<Arc<TenantContext>>,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Thread-safe in-memory tenant cache
///
/// A poisoned lock is treated as an unavailable cache: lookups miss and writes
/// are dropped, so resolution falls through to the registry instead of failing.
pub struct TenantCache {
    /// Maps context key (lowercased host) -> resolved tenant
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
    negative_ttl: Option<Duration>,
    clock: Arc<dyn Clock>,
}

impl Default for TenantCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TenantCache {
    /// Create a new cache with default TTL
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_CACHE_TTL)
    }

    /// Create a new cache with custom TTL
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            negative_ttl: None,
            clock: Arc::new(SystemClock),
        }
    }

    /// Use a different time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Also cache "no tenant" results, for `ttl`
    pub fn with_negative_ttl(mut self, ttl: Duration) -> Self {
        self.negative_ttl = Some(ttl);
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn negative_ttl(&self) -> Option<Duration> {
        self.negative_ttl
    }

    /// Get the cached tenant for a context key
    /// Returns Some(Some(context)) if found and valid
    /// Returns Some(None) if the key was cached as not resolving
    /// Returns None if not in cache, expired, or the cache is unavailable
    pub fn get(&self, key: &str) -> Option<Option<Arc<TenantContext>>> {
        let now = self.clock.now();
        let entries = self.entries.read().ok()?;
        let entry = entries.get(key)?;

        if entry.is_expired(now) {
            None
        } else {
            Some(entry.context.clone())
        }
    }

    /// Cache a key -> tenant mapping
    pub fn insert(&self, key: &str, context: Arc<TenantContext>) {
        self.insert_aliases(&[key.to_string()], &context);
    }

    /// Cache the same tenant under several keys, all expiring together
    pub fn insert_aliases(&self, keys: &[String], context: &Arc<TenantContext>) {
        let expires_at = self.clock.now() + self.ttl;
        match self.entries.write() {
            Ok(mut entries) => {
                for key in keys {
                    entries.insert(
                        key.clone(),
                        CacheEntry {
                            context: Some(Arc::clone(context)),
                            expires_at,
                        },
                    );
                }
            }
            Err(_) => {
                tracing::warn!(
                    tenant_id = %context.tenant_id(),
                    "Tenant cache unavailable, skipping insert"
                );
            }
        }
    }

    /// Cache a "no tenant" result for a key
    ///
    /// No-op unless negative caching was enabled with [`Self::with_negative_ttl`].
    pub fn insert_negative(&self, key: &str) {
        let Some(ttl) = self.negative_ttl else {
            return;
        };
        let expires_at = self.clock.now() + ttl;
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(
                key.to_string(),
                CacheEntry {
                    context: None,
                    expires_at,
                },
            );
        }
    }

    /// Invalidate a specific key
    pub fn invalidate(&self, key: &str) {
        if let Ok(mut entries) = self.entries.write() {
            entries.remove(key);
        }
    }

    /// Invalidate all entries for a tenant (every alias it was cached under)
    pub fn invalidate_tenant(&self, tenant_id: &TenantId) {
        if let Ok(mut entries) = self.entries.write() {
            entries.retain(|_, entry| {
                entry
                    .context
                    .as_ref()
                    .map_or(true, |context| context.tenant_id() != tenant_id)
            });
        }
    }

    /// Drop every entry
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }

    /// Clear expired entries (call periodically for memory management)
    ///
    /// Returns the number of entries removed.
    pub fn cleanup(&self) -> usize {
        let now = self.clock.now();
        match self.entries.write() {
            Ok(mut entries) => {
                let before = entries.len();
                entries.retain(|_, entry| !entry.is_expired(now));
                before - entries.len()
            }
            Err(_) => 0,
        }
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now();
        if let Ok(entries) = self.entries.read() {
            let total = entries.len();
            let expired = entries.values().filter(|e| e.is_expired(now)).count();
            let negative = entries
                .values()
                .filter(|e| e.context.is_none() && !e.is_expired(now))
                .count();
            CacheStats {
                total_entries: total,
                expired_entries: expired,
                active_entries: total - expired,
                negative_entries: negative,
            }
        } else {
            CacheStats::default()
        }
    }
}

/// Cache statistics
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub expired_entries: usize,
    pub active_entries: usize,
    pub negative_entries: usize,
}
