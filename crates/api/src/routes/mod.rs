//! HTTP routes

pub mod health;
pub mod home;

use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::{error::ApiError, middleware::tenant_middleware, state::AppState};

/// Create all routes
pub fn create_router(state: AppState) -> Router {
    // Health check routes (no tenant, probes hit the bare service address)
    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness));

    // Tenant-scoped routes
    let tenant_routes = Router::new()
        .route("/", get(home::index))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            tenant_middleware,
        ));

    Router::new()
        .merge(health_routes)
        .merge(tenant_routes)
        .fallback(fallback)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn fallback() -> ApiError {
    ApiError::NotFound
}
