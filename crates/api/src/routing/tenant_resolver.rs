//! Host-to-Tenant Resolution
//!
//! Uncached lookup of the tenant that owns a context key. Registry order is
//! significant: the first tenant listing the host wins. The registry rejects
//! duplicate hostnames at load, so in practice the first match is the only one.

use std::sync::Arc;

use tenantkit_shared::{TenantContext, TenantRegistry};

/// Resolves a context key to a tenant
///
/// `None` means no tenant owns the key. That is an expected outcome (unknown
/// domains, health-check probes), not an error.
pub trait TenantResolver: Send + Sync {
    fn resolve(&self, key: &str) -> Option<TenantContext>;
}

impl<T: TenantResolver + ?Sized> TenantResolver for Arc<T> {
    fn resolve(&self, key: &str) -> Option<TenantContext> {
        (**self).resolve(key)
    }
}

/// Linear scan over the tenant registry
#[derive(Clone)]
pub struct RegistryResolver {
    registry: Arc<TenantRegistry>,
}

impl RegistryResolver {
    pub fn new(registry: Arc<TenantRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &TenantRegistry {
        &self.registry
    }
}

impl TenantResolver for RegistryResolver {
    fn resolve(&self, key: &str) -> Option<TenantContext> {
        if key.is_empty() {
            return None;
        }

        let key = key.to_lowercase();
        match self.registry.iter().find(|tenant| tenant.matches_host(&key)) {
            Some(tenant) => Some(TenantContext::new(Arc::clone(tenant))),
            None => {
                tracing::debug!(host = %key, "No tenant matches host");
                None
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tenantkit_shared::Tenant;

    fn resolver() -> RegistryResolver {
        let registry = TenantRegistry::new(vec![
            Tenant::new("acme", ["acme.local", "www.acme.local"]),
            Tenant::new("globex", ["globex.local"]),
        ])
        .unwrap();
        RegistryResolver::new(Arc::new(registry))
    }

    fn resolved_id(resolver: &RegistryResolver, key: &str) -> Option<String> {
        resolver
            .resolve(key)
            .map(|context| context.tenant_id().to_string())
    }

    #[test]
    fn test_resolve_known_hosts() {
        let resolver = resolver();

        assert_eq!(resolved_id(&resolver, "acme.local").as_deref(), Some("acme"));
        assert_eq!(resolved_id(&resolver, "www.acme.local").as_deref(), Some("acme"));
        assert_eq!(resolved_id(&resolver, "globex.local").as_deref(), Some("globex"));
    }

    #[test]
    fn test_resolve_unknown_host() {
        let resolver = resolver();

        assert!(resolver.resolve("unknown.local").is_none());
        assert!(resolver.resolve("acme.local.evil.com").is_none());
        assert!(resolver.resolve("").is_none());
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        let resolver = resolver();

        assert_eq!(
            resolved_id(&resolver, "Acme.LOCAL"),
            resolved_id(&resolver, "acme.local")
        );
    }

    #[test]
    fn test_every_hostname_resolves_to_its_tenant() {
        let resolver = resolver();

        for tenant in resolver.registry().iter() {
            for hostname in &tenant.hostnames {
                let context = resolver.resolve(&hostname.to_lowercase()).unwrap();
                assert_eq!(context.tenant_id(), &tenant.id);
            }
        }
    }

    #[test]
    fn test_each_resolution_is_a_fresh_context() {
        let resolver = resolver();
        let a = resolver.resolve("acme.local").unwrap();
        let b = resolver.resolve("acme.local").unwrap();

        assert_ne!(a.id(), b.id());
    }
}
