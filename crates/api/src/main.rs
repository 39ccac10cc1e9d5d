//! tenantkit API server

use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use tenantkit_api::{
    config::LogFormat, routes::create_router, routing::spawn_cleanup_task, AppState, Config,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().context("Invalid configuration")?;
    init_tracing(config.log_format);

    // Fail fast: never serve traffic with a missing or ambiguous registry
    let registry = config.load_registry().with_context(|| {
        format!(
            "Failed to load tenants from {}",
            config.tenants_config.display()
        )
    })?;
    tracing::info!(
        tenants = registry.len(),
        path = %config.tenants_config.display(),
        "Tenant registry loaded"
    );

    let state = AppState::from_config(&config, Arc::new(registry));
    let sweeper = spawn_cleanup_task(
        Arc::clone(state.tenant_cache()),
        config.cache_cleanup_interval,
    );
    tracing::info!(
        ttl_secs = config.cache_ttl.as_secs(),
        negative_ttl_secs = config.negative_cache_ttl.map(|ttl| ttl.as_secs()),
        "Tenant cache ready"
    );

    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address))?;
    tracing::info!(address = %config.bind_address, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    sweeper.abort();
    tracing::info!("Shut down");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tenantkit_api=debug,tower_http=info"));

    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
