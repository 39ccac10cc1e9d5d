//! Shared application state

use std::sync::Arc;

use tenantkit_shared::TenantRegistry;

use crate::config::Config;
use crate::middleware::MissingTenantPolicy;
use crate::routing::{CachingTenantResolver, RegistryResolver, TenantCache};

/// Tenant resolver used by the HTTP layer
pub type AppTenantResolver = CachingTenantResolver<RegistryResolver>;

/// State shared by every request handler
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<TenantRegistry>,
    pub tenants: Arc<AppTenantResolver>,
    pub missing_tenant_policy: MissingTenantPolicy,
}

impl AppState {
    pub fn new(
        registry: Arc<TenantRegistry>,
        cache: Arc<TenantCache>,
        missing_tenant_policy: MissingTenantPolicy,
    ) -> Self {
        let resolver = RegistryResolver::new(Arc::clone(&registry));
        Self {
            registry,
            tenants: Arc::new(CachingTenantResolver::new(resolver, cache)),
            missing_tenant_policy,
        }
    }

    /// Build state from configuration and an already loaded registry
    pub fn from_config(config: &Config, registry: Arc<TenantRegistry>) -> Self {
        Self::new(
            registry,
            Arc::new(config.build_cache()),
            config.missing_tenant_policy(),
        )
    }

    /// Cache behind the tenant resolver
    pub fn tenant_cache(&self) -> &Arc<TenantCache> {
        self.tenants.cache()
    }
}
