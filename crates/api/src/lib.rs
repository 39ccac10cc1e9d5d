//! tenantkit API Library
//!
//! Host-based tenant resolution for the HTTP layer: the caching resolver, the
//! middleware that binds the resolved tenant to each request, and the routes
//! that consume it.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod routing;
pub mod state;

pub use config::Config;
pub use error::ApiError;
pub use middleware::{CurrentTenant, MissingTenantPolicy};
pub use routing::{CachingTenantResolver, RegistryResolver, TenantCache, TenantResolver};
pub use state::AppState;
