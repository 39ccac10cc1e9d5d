//! Tenant landing endpoint
//!
//! Echoes the tenant bound to the request so deployments can check which
//! tenant a hostname maps to.

use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use crate::middleware::CurrentTenant;

#[derive(Serialize)]
pub struct TenantResponse {
    pub tenant_id: String,
    pub name: String,
    pub hostnames: Vec<String>,
    pub settings: serde_json::Map<String, serde_json::Value>,
    /// Changes only when the tenant is re-resolved (cache miss or expiry)
    pub context_id: Uuid,
}

/// Current tenant
pub async fn index(CurrentTenant(context): CurrentTenant) -> Json<TenantResponse> {
    let tenant = context.tenant();
    Json(TenantResponse {
        tenant_id: tenant.id.to_string(),
        name: tenant.display_name().to_string(),
        hostnames: tenant.hostnames.clone(),
        settings: tenant.settings.clone(),
        context_id: context.id(),
    })
}
