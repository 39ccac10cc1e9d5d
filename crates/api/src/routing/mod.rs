//! Host-based tenant resolution
//!
//! This module resolves the Host of an incoming request to the tenant that owns
//! it:
//! - Context key: the lowercased host (`context_key`)
//! - Uncached lookup: linear scan of the tenant registry (`RegistryResolver`)
//! - Caching: absolute-TTL cache keyed by host, warmed for every tenant alias
//!   (`CachingTenantResolver`, `TenantCache`)

mod cache;
mod caching_resolver;
mod clock;
mod context_key;
mod sweep;
mod tenant_resolver;

pub use cache::{CacheStats, TenantCache, DEFAULT_CACHE_TTL};
pub use caching_resolver::{
    tenant_hostnames, AliasStrategy, CachingTenantResolver, KeyStrategy,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use context_key::{context_key, request_context_key, HostSource};
pub use sweep::spawn_cleanup_task;
pub use tenant_resolver::{RegistryResolver, TenantResolver};
