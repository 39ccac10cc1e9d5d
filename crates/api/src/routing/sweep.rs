//! Background eviction of expired tenant cache entries

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::cache::TenantCache;

/// Periodically drop expired entries from the cache
///
/// Lookups already ignore expired entries; the sweep only bounds memory for
/// hosts that are never requested again. Abort the returned handle on shutdown.
pub fn spawn_cleanup_task(cache: Arc<TenantCache>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let removed = cache.cleanup();
            if removed > 0 {
                tracing::debug!(
                    removed,
                    remaining = cache.stats().total_entries,
                    "Evicted expired tenant cache entries"
                );
            }
        }
    })
}
