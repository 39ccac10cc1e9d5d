//! Tenant Binding Middleware
//!
//! Resolves the tenant for every request and stores it in the request
//! extensions as `Arc<TenantContext>`, where handlers pick it up through the
//! [`CurrentTenant`] extractor.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use tenantkit_shared::TenantContext;

use crate::error::ApiError;
use crate::routing::HostSource;
use crate::state::AppState;

/// What to do with a request whose host matches no tenant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingTenantPolicy {
    /// Respond 404 without running the handler
    Reject,
    /// Run the handler without a tenant bound
    PassThrough,
}

/// Middleware that binds the resolved tenant to the request
pub async fn tenant_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let host = request.host().unwrap_or_default().to_string();

    match state.tenants.resolve_host(&host).await {
        Some(context) => {
            tracing::debug!(
                host = %host,
                tenant_id = %context.tenant_id(),
                "Bound tenant to request"
            );
            request.extensions_mut().insert(context);
            next.run(request).await
        }
        None => match state.missing_tenant_policy {
            MissingTenantPolicy::Reject => {
                tracing::debug!(host = %host, "Rejecting request for unknown host");
                ApiError::TenantNotFound(host).into_response()
            }
            MissingTenantPolicy::PassThrough => next.run(request).await,
        },
    }
}

/// The tenant bound to the current request
#[derive(Debug, Clone)]
pub struct CurrentTenant(pub Arc<TenantContext>);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentTenant {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Arc<TenantContext>>()
            .cloned()
            .map(CurrentTenant)
            .ok_or_else(|| ApiError::TenantNotFound(parts.host().unwrap_or_default().to_string()))
    }
}
