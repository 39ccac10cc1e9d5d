//! tenantkit Shared Types
//!
//! Tenant definitions, the tenant registry and the errors raised while
//! loading it. Shared by the API crate and anything else that needs to reason
//! about tenants.

pub mod error;
pub mod registry;
pub mod types;

pub use error::*;
pub use registry::TenantRegistry;
pub use types::*;
