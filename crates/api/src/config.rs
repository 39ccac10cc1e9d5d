//! Application configuration

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use tenantkit_shared::{RegistryError, TenantRegistry};

use crate::middleware::MissingTenantPolicy;
use crate::routing::TenantCache;

/// Output format for logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub bind_address: String,

    // Tenants
    pub tenants_config: PathBuf,
    pub reject_unknown_hosts: bool,

    // Tenant cache
    pub cache_ttl: Duration,
    pub negative_cache_ttl: Option<Duration>,
    pub cache_cleanup_interval: Duration,

    // Logging
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            // Server
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),

            // Tenants
            tenants_config: env::var("TENANTS_CONFIG")
                .unwrap_or_else(|_| "tenants.json".to_string())
                .into(),
            reject_unknown_hosts: parse_bool("REJECT_UNKNOWN_HOSTS", true)?,

            // Tenant cache (30 minute absolute expiry by default)
            cache_ttl: parse_secs("TENANT_CACHE_TTL_SECS")?
                .unwrap_or(Duration::from_secs(30 * 60)),
            negative_cache_ttl: parse_secs("TENANT_NEGATIVE_CACHE_TTL_SECS")?,
            cache_cleanup_interval: parse_secs("TENANT_CACHE_CLEANUP_INTERVAL_SECS")?
                .unwrap_or(Duration::from_secs(60)),

            // Logging
            log_format: match env::var("LOG_FORMAT").ok().as_deref() {
                None | Some("pretty") => LogFormat::Pretty,
                Some("json") => LogFormat::Json,
                Some(other) => {
                    return Err(ConfigError::Invalid {
                        name: "LOG_FORMAT",
                        value: other.to_string(),
                    })
                }
            },
        })
    }

    /// Load the tenant registry this configuration points at
    pub fn load_registry(&self) -> Result<TenantRegistry, RegistryError> {
        TenantRegistry::load(&self.tenants_config)
    }

    /// Build the tenant cache described by this configuration
    pub fn build_cache(&self) -> TenantCache {
        let cache = TenantCache::with_ttl(self.cache_ttl);
        match self.negative_cache_ttl {
            Some(ttl) => cache.with_negative_ttl(ttl),
            None => cache,
        }
    }

    pub fn missing_tenant_policy(&self) -> MissingTenantPolicy {
        if self.reject_unknown_hosts {
            MissingTenantPolicy::Reject
        } else {
            MissingTenantPolicy::PassThrough
        }
    }
}

/// Read a positive number of seconds; unset means None
fn parse_secs(name: &'static str) -> Result<Option<Duration>, ConfigError> {
    let Ok(value) = env::var(name) else {
        return Ok(None);
    };
    let secs: u64 = value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { name, value })?;
    if secs == 0 {
        return Err(ConfigError::ZeroDuration(name));
    }
    Ok(Some(Duration::from_secs(secs)))
}

fn parse_bool(name: &'static str, default: bool) -> Result<bool, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
}
