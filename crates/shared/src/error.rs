//! Error types for tenantkit

use std::path::PathBuf;
use thiserror::Error;

use crate::types::TenantId;

/// Errors raised while loading the tenant registry
///
/// All of these are fatal at startup: serving traffic with an ambiguous or
/// half-parsed registry could bind requests to the wrong tenant.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Failed to read tenant configuration {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed tenant configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Tenant at position {0} has an empty identifier")]
    EmptyId(usize),

    #[error("Duplicate tenant identifier: {0}")]
    DuplicateId(TenantId),

    #[error("Tenant {0} has no hostnames")]
    NoHostnames(TenantId),

    #[error("Tenant {0} has an empty hostname")]
    EmptyHostname(TenantId),

    #[error("Hostname {hostname} is claimed by both {first} and {second}")]
    DuplicateHostname {
        hostname: String,
        first: TenantId,
        second: TenantId,
    },
}
