//! Caching tenant resolution
//!
//! Wraps a [`TenantResolver`] with a [`TenantCache`]. Hits never reach the
//! inner resolver. On a miss the tenant is cached under every one of its
//! hostnames, so resolving one alias warms the others. Concurrent misses for
//! the same key wait on a per-key gate and re-check the cache, collapsing to a
//! single inner resolution.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Mutex as AsyncMutex;

use tenantkit_shared::TenantContext;

use super::cache::TenantCache;
use super::context_key::{context_key, HostSource};
use super::tenant_resolver::TenantResolver;

/// Turns a raw host into a context key
pub type KeyStrategy = fn(&str) -> String;

/// Lists the hosts a resolved tenant should be cached under
pub type AliasStrategy = fn(&TenantContext) -> Vec<String>;

/// Default alias strategy: every hostname of the tenant
pub fn tenant_hostnames(context: &TenantContext) -> Vec<String> {
    context.tenant().hostnames.clone()
}

type Gate = Arc<AsyncMutex<()>>;

/// Tenant resolver with a time-expiring cache in front
pub struct CachingTenantResolver<R, K = KeyStrategy, A = AliasStrategy> {
    inner: R,
    cache: Arc<TenantCache>,
    key_of: K,
    aliases_of: A,
    in_flight: Mutex<HashMap<String, Gate>>,
}

impl<R: TenantResolver> CachingTenantResolver<R> {
    /// Key on the lowercased host, cache under every tenant hostname
    pub fn new(inner: R, cache: Arc<TenantCache>) -> Self {
        Self::with_strategies(inner, cache, context_key, tenant_hostnames)
    }
}

impl<R, K, A> CachingTenantResolver<R, K, A>
where
    R: TenantResolver,
    K: Fn(&str) -> String + Send + Sync,
    A: Fn(&TenantContext) -> Vec<String> + Send + Sync,
{
    pub fn with_strategies(inner: R, cache: Arc<TenantCache>, key_of: K, aliases_of: A) -> Self {
        Self {
            inner,
            cache,
            key_of,
            aliases_of,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub fn cache(&self) -> &Arc<TenantCache> {
        &self.cache
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    /// Resolve the tenant that owns a request
    pub async fn resolve<H: HostSource + ?Sized>(
        &self,
        request: &H,
    ) -> Option<Arc<TenantContext>> {
        let key = (self.key_of)(request.host().unwrap_or_default());
        self.resolve_key(&key).await
    }

    /// Resolve the tenant that owns a raw host value
    pub async fn resolve_host(&self, host: &str) -> Option<Arc<TenantContext>> {
        let key = (self.key_of)(host);
        self.resolve_key(&key).await
    }

    async fn resolve_key(&self, key: &str) -> Option<Arc<TenantContext>> {
        if key.is_empty() {
            tracing::debug!("Request has no host, no tenant to resolve");
            return None;
        }

        if let Some(cached) = self.cache.get(key) {
            tracing::trace!(host = %key, "Tenant cache hit");
            return cached;
        }

        let Some(gate) = self.gate(key) else {
            return self.resolve_and_store(key);
        };
        let in_flight = InFlight {
            table: &self.in_flight,
            key,
            gate,
        };
        let _permit = in_flight.gate.lock().await;

        // Another task may have resolved this key while we waited
        if let Some(cached) = self.cache.get(key) {
            tracing::trace!(host = %key, "Tenant cache hit after wait");
            return cached;
        }

        self.resolve_and_store(key)
    }

    fn resolve_and_store(&self, key: &str) -> Option<Arc<TenantContext>> {
        match self.inner.resolve(key) {
            Some(context) => {
                let context = Arc::new(context);
                let mut aliases: Vec<String> = (self.aliases_of)(&context)
                    .iter()
                    .map(|alias| (self.key_of)(alias))
                    .collect();
                if !aliases.iter().any(|alias| alias == key) {
                    aliases.push(key.to_string());
                }
                self.cache.insert_aliases(&aliases, &context);

                tracing::debug!(
                    host = %key,
                    tenant_id = %context.tenant_id(),
                    aliases = aliases.len(),
                    "Tenant resolved and cached"
                );
                Some(context)
            }
            None => {
                self.cache.insert_negative(key);
                None
            }
        }
    }

    /// Gate for a key, shared by every task currently resolving it
    ///
    /// None when the gate table is poisoned; callers then resolve directly.
    fn gate(&self, key: &str) -> Option<Gate> {
        let mut in_flight = self.in_flight.lock().ok()?;
        let gate = in_flight
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())));
        Some(Arc::clone(gate))
    }
}

/// Removes a key's gate from the table once its last user is done or dropped
///
/// The guard owns the task's only handle to the gate, so a strong count of two
/// (table plus this guard) means no other task is holding or waiting on it.
struct InFlight<'a> {
    table: &'a Mutex<HashMap<String, Gate>>,
    key: &'a str,
    gate: Gate,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if let Ok(mut table) = self.table.lock() {
            if table
                .get(self.key)
                .is_some_and(|current| {
                    Arc::ptr_eq(current, &self.gate) && Arc::strong_count(&self.gate) == 2
                })
            {
                table.remove(self.key);
            }
        }
    }
}
