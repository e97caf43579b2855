//! Background task that purges request contexts older than the maximum age.
//!
//! Entries are normally cleared when their request completes; the sweeper
//! catches entries whose guard leaked or whose request never finished.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use super::store::ContextStore;
use crate::network::ContextConfig;

const MIN_PURGE_INTERVAL: Duration = Duration::from_millis(100);

/// Spawns the purge loop. It exits once `shutdown` flips to `true` or its
/// sender is dropped.
///
/// A zero `max_age` disables purging: `ContextStore::purge` would read it as
/// "remove everything", including entries of requests still running.
#[must_use]
pub fn spawn_purge_task(
    store: Arc<ContextStore>,
    config: ContextConfig,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        if config.max_age.is_zero() {
            debug!("context purge disabled");
            return;
        }

        // interval() panics on a zero period.
        let period = config.purge_interval.max(MIN_PURGE_INTERVAL);
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = store.purge(config.max_age);
                    if removed > 0 {
                        warn!(removed, "purged stale request contexts");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        debug!("context purge task stopping");
                        break;
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::ShutdownController;

    fn config() -> ContextConfig {
        ContextConfig {
            max_age: Duration::from_secs(10),
            purge_interval: Duration::from_secs(5),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn purges_stale_entries_on_tick() {
        let store = Arc::new(ContextStore::new());
        let shutdown = ShutdownController::new();
        let guard = store.begin();
        store.set(guard.id(), "user", "wuyazi");

        let handle = spawn_purge_task(Arc::clone(&store), config(), shutdown.shutdown_receiver());

        tokio::time::sleep(Duration::from_secs(16)).await;
        assert!(store.is_empty());

        shutdown.trigger_shutdown();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn keeps_fresh_entries() {
        let store = Arc::new(ContextStore::new());
        let shutdown = ShutdownController::new();

        let handle = spawn_purge_task(Arc::clone(&store), config(), shutdown.shutdown_receiver());

        tokio::time::sleep(Duration::from_secs(6)).await;
        let guard = store.begin();
        store.set(guard.id(), "user", "wuyazi");
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(store.len(), 1);

        shutdown.trigger_shutdown();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn zero_max_age_never_purges_live_request() {
        let store = Arc::new(ContextStore::new());
        let shutdown = ShutdownController::new();
        let guard = store.begin();
        store.set(guard.id(), "user", "wuyazi");

        let config = ContextConfig {
            max_age: Duration::ZERO,
            purge_interval: Duration::from_secs(1),
        };
        let handle = spawn_purge_task(Arc::clone(&store), config, shutdown.shutdown_receiver());

        tokio::time::sleep(Duration::from_millis(3100)).await;
        assert_eq!(
            store.get(guard.id(), "user"),
            Some(reqscope_core::Value::from("wuyazi"))
        );

        handle.await.unwrap();
    }

    #[tokio::test]
    async fn stops_when_shutdown_sender_dropped() {
        let store = Arc::new(ContextStore::new());
        let shutdown = ShutdownController::new();
        let handle = spawn_purge_task(store, config(), shutdown.shutdown_receiver());

        drop(shutdown);
        handle.await.unwrap();
    }
}
