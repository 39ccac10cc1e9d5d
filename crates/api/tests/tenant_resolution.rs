//! Integration tests for host-based tenant resolution
//!
//! Runs the acme / globex scenario end to end: registry loaded from a JSON
//! file, resolved through the caching resolver and served by the router.
//!
//! ## Running Tests
//! ```bash
//! cargo test -p tenantkit-api --test tenant_resolution
//! ```

#![allow(clippy::unwrap_used)]

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use tenantkit_api::{
    routes::create_router,
    routing::{ManualClock, TenantCache},
    AppState, CachingTenantResolver, MissingTenantPolicy, RegistryResolver, TenantResolver,
};
use tenantkit_shared::{TenantContext, TenantRegistry};

// ============================================================================
// Test Utilities
// ============================================================================

const TENANTS_JSON: &str = r#"{
    "multitenancy": {
        "tenants": [
            {
                "id": "acme",
                "name": "Acme Corporation",
                "hostnames": ["acme.local", "www.acme.local"],
                "theme": "Cerulean"
            },
            {
                "id": "globex",
                "hostnames": ["globex.local"],
                "theme": "Darkly"
            }
        ]
    }
}"#;

fn load_registry() -> Arc<TenantRegistry> {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(TENANTS_JSON.as_bytes()).unwrap();
    Arc::new(TenantRegistry::load(file.path()).unwrap())
}

/// Counts how often the registry is actually scanned
struct ScanCounter {
    inner: RegistryResolver,
    scans: AtomicUsize,
}

impl TenantResolver for ScanCounter {
    fn resolve(&self, key: &str) -> Option<TenantContext> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        self.inner.resolve(key)
    }
}

fn counting_resolver(
    cache: TenantCache,
) -> (CachingTenantResolver<Arc<ScanCounter>>, Arc<ScanCounter>) {
    let counter = Arc::new(ScanCounter {
        inner: RegistryResolver::new(load_registry()),
        scans: AtomicUsize::new(0),
    });
    let resolver = CachingTenantResolver::new(Arc::clone(&counter), Arc::new(cache));
    (resolver, counter)
}

async fn get_json(app: Router, host: &str, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(
            Request::builder()
                .uri(uri)
                .header("Host", host)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

// ============================================================================
// Resolution
// ============================================================================

#[tokio::test]
async fn test_scenario_resolves_each_host() {
    let (resolver, _) = counting_resolver(TenantCache::new());

    let cases = [
        ("acme.local", Some("acme")),
        ("www.acme.local", Some("acme")),
        ("globex.local", Some("globex")),
        ("unknown.local", None),
    ];

    for (host, expected) in cases {
        let resolved = resolver.resolve_host(host).await;
        assert_eq!(
            resolved.as_ref().map(|c| c.tenant_id().as_str()),
            expected,
            "host {host}"
        );
    }
}

#[tokio::test]
async fn test_alias_prewarm_and_idempotence() {
    let (resolver, counter) = counting_resolver(TenantCache::new());

    let first = resolver.resolve("acme.local").await.unwrap();
    let again = resolver.resolve("acme.local").await.unwrap();
    let alias = resolver.resolve("WWW.ACME.LOCAL").await.unwrap();

    assert!(Arc::ptr_eq(&first, &again));
    assert!(Arc::ptr_eq(&first, &alias));
    assert_eq!(counter.scans.load(Ordering::SeqCst), 1);
    assert_eq!(resolver.cache().stats().active_entries, 2);
}

#[tokio::test]
async fn test_expiry_forces_a_fresh_scan() {
    let clock = ManualClock::new();
    let cache = TenantCache::with_ttl(Duration::from_secs(30 * 60)).with_clock(Arc::new(clock.clone()));
    let (resolver, counter) = counting_resolver(cache);

    let first = resolver.resolve_host("globex.local").await.unwrap();

    // Repeated access inside the window does not extend it
    for _ in 0..3 {
        clock.advance(Duration::from_secs(10 * 60) - Duration::from_secs(1));
        resolver.resolve_host("globex.local").await.unwrap();
    }
    assert_eq!(counter.scans.load(Ordering::SeqCst), 1);

    clock.advance(Duration::from_secs(3));
    let second = resolver.resolve_host("globex.local").await.unwrap();
    assert_eq!(counter.scans.load(Ordering::SeqCst), 2);
    assert_ne!(first.id(), second.id());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_for_different_hosts() {
    let (resolver, counter) = counting_resolver(TenantCache::new());
    let resolver = Arc::new(resolver);

    let hosts = ["acme.local", "www.acme.local", "globex.local", "unknown.local"];
    let tasks: Vec<_> = (0..64)
        .map(|i| {
            let resolver = Arc::clone(&resolver);
            let host = hosts[i % hosts.len()];
            tokio::spawn(async move { (host, resolver.resolve_host(host).await) })
        })
        .collect();

    for task in tasks {
        let (host, resolved) = task.await.unwrap();
        let expected = match host {
            "acme.local" | "www.acme.local" => Some("acme"),
            "globex.local" => Some("globex"),
            _ => None,
        };
        assert_eq!(resolved.as_ref().map(|c| c.tenant_id().as_str()), expected);
    }

    // Unknown hosts are not cached, so each of their 16 requests scans. acme and
    // www.acme.local hold separate gates and may both scan once; globex scans once.
    let stats = resolver.cache().stats();
    assert_eq!(stats.active_entries, 3);
    let scans = counter.scans.load(Ordering::SeqCst);
    assert!((18..=19).contains(&scans), "unexpected scan count {scans}");
}

// ============================================================================
// HTTP
// ============================================================================

#[tokio::test]
async fn test_router_binds_tenant() {
    let state = AppState::new(
        load_registry(),
        Arc::new(TenantCache::new()),
        MissingTenantPolicy::Reject,
    );
    let app = create_router(state.clone());

    let (status, body) = get_json(app.clone(), "www.acme.local", "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tenant_id"], "acme");
    assert_eq!(body["name"], "Acme Corporation");
    assert_eq!(body["settings"]["theme"], "Cerulean");

    // Served from cache: same context
    let (_, again) = get_json(app.clone(), "acme.local", "/").await;
    assert_eq!(again["context_id"], body["context_id"]);

    let (status, body) = get_json(app.clone(), "globex.local", "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "globex");

    let (status, body) = get_json(app, "unknown.local", "/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "TENANT_NOT_FOUND");
}

#[tokio::test]
async fn test_health_does_not_require_tenant() {
    let state = AppState::new(
        load_registry(),
        Arc::new(TenantCache::new()),
        MissingTenantPolicy::Reject,
    );
    let app = create_router(state);

    let (status, body) = get_json(app.clone(), "10.0.0.5:3000", "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["tenants"], 2);

    let (status, body) = get_json(app, "acme.local", "/does-not-exist").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_pass_through_policy_reaches_handler() {
    let state = AppState::new(
        load_registry(),
        Arc::new(TenantCache::new()),
        MissingTenantPolicy::PassThrough,
    );
    let app = create_router(state);

    // The landing route itself still needs a tenant, so the extractor rejects
    let (status, body) = get_json(app, "unknown.local", "/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "TENANT_NOT_FOUND");
}
