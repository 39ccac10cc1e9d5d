//! Tenant registry
//!
//! The full, ordered set of tenant definitions. Loaded once at startup and
//! read-only afterwards, so it is shared behind an `Arc` without locking.

use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use crate::error::RegistryError;
use crate::types::{Tenant, TenantId};

/// Accepted layouts of the tenant configuration file
#[derive(Deserialize)]
#[serde(untagged)]
enum TenantsDocument {
    /// `{"multitenancy": {"tenants": [...]}}`
    Wrapped {
        #[serde(alias = "Multitenancy")]
        multitenancy: TenantsSection,
    },
    /// `{"tenants": [...]}`
    Bare(TenantsSection),
}

#[derive(Deserialize)]
struct TenantsSection {
    #[serde(alias = "Tenants")]
    tenants: Vec<Tenant>,
}

/// Validated, immutable collection of tenants
#[derive(Debug, Default)]
pub struct TenantRegistry {
    tenants: Vec<Arc<Tenant>>,
}

impl TenantRegistry {
    /// Build a registry, normalizing hostnames to lowercase
    ///
    /// Rejects empty identifiers, duplicate identifiers, tenants without
    /// hostnames, empty hostnames and hostnames claimed by more than one tenant.
    pub fn new(tenants: Vec<Tenant>) -> Result<Self, RegistryError> {
        let mut ids: HashSet<TenantId> = HashSet::with_capacity(tenants.len());
        let mut owners: HashMap<String, TenantId> = HashMap::new();
        let mut validated = Vec::with_capacity(tenants.len());

        for (position, mut tenant) in tenants.into_iter().enumerate() {
            if tenant.id.as_str().trim().is_empty() {
                return Err(RegistryError::EmptyId(position));
            }
            if !ids.insert(tenant.id.clone()) {
                return Err(RegistryError::DuplicateId(tenant.id));
            }
            if tenant.hostnames.is_empty() {
                return Err(RegistryError::NoHostnames(tenant.id));
            }

            let configured = std::mem::take(&mut tenant.hostnames);
            let mut hostnames = Vec::with_capacity(configured.len());
            for hostname in configured {
                let hostname = hostname.trim().to_lowercase();
                if hostname.is_empty() {
                    return Err(RegistryError::EmptyHostname(tenant.id));
                }
                if hostnames.contains(&hostname) {
                    tracing::warn!(
                        tenant_id = %tenant.id,
                        hostname = %hostname,
                        "Hostname listed twice for the same tenant, ignoring repeat"
                    );
                    continue;
                }
                if let Some(first) = owners.get(&hostname) {
                    return Err(RegistryError::DuplicateHostname {
                        hostname,
                        first: first.clone(),
                        second: tenant.id,
                    });
                }
                owners.insert(hostname.clone(), tenant.id.clone());
                hostnames.push(hostname);
            }

            tenant.hostnames = hostnames;
            validated.push(Arc::new(tenant));
        }

        if validated.is_empty() {
            tracing::warn!("Tenant registry is empty, every host will resolve to no tenant");
        }

        Ok(Self { tenants: validated })
    }

    /// Parse and validate a JSON tenant document
    pub fn from_json_str(json: &str) -> Result<Self, RegistryError> {
        let document: TenantsDocument = serde_json::from_str(json)?;
        let section = match document {
            TenantsDocument::Wrapped { multitenancy } => multitenancy,
            TenantsDocument::Bare(section) => section,
        };
        Self::new(section.tenants)
    }

    /// Read, parse and validate a JSON tenant file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Tenants in configuration order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Tenant>> {
        self.tenants.iter()
    }

    /// Find a tenant by ID
    pub fn get(&self, id: &TenantId) -> Option<&Arc<Tenant>> {
        self.tenants.iter().find(|t| &t.id == id)
    }

    pub fn len(&self) -> usize {
        self.tenants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tenants.is_empty()
    }
}
