//! Graceful shutdown controller with in-flight request tracking.
//!
//! Health state lives in an `ArcSwap` so probes read it without locking.
//! In-flight requests are counted by RAII guards handed out to
//! `ContextLayer`, one per request.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use tokio::sync::watch;

/// Server health state.
///
/// State machine: Starting -> Ready -> Draining -> Stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    /// Listener not yet serving.
    Starting,
    Ready,
    /// Shutdown signalled; waiting for in-flight requests.
    Draining,
    Stopped,
}

impl HealthState {
    /// Lowercase name used in the `/health` JSON body.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Starting => "starting",
            Self::Ready => "ready",
            Self::Draining => "draining",
            Self::Stopped => "stopped",
        }
    }
}

/// Coordinates health state, the shutdown signal, and in-flight counting.
#[derive(Debug)]
pub struct ShutdownController {
    shutdown_signal: watch::Sender<bool>,
    in_flight: Arc<AtomicU64>,
    health_state: ArcSwap<HealthState>,
}

impl ShutdownController {
    /// Creates a controller in the `Starting` state.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            shutdown_signal: tx,
            in_flight: Arc::new(AtomicU64::new(0)),
            health_state: ArcSwap::from_pointee(HealthState::Starting),
        }
    }

    pub fn set_ready(&self) {
        self.health_state.store(Arc::new(HealthState::Ready));
    }

    /// Returns a receiver that flips to `true` when shutdown is triggered.
    #[must_use]
    pub fn shutdown_receiver(&self) -> watch::Receiver<bool> {
        self.shutdown_signal.subscribe()
    }

    /// Moves to `Draining` and notifies every shutdown receiver.
    pub fn trigger_shutdown(&self) {
        self.health_state.store(Arc::new(HealthState::Draining));
        // No receivers is fine.
        let _ = self.shutdown_signal.send(true);
    }

    #[must_use]
    pub fn health_state(&self) -> HealthState {
        **self.health_state.load()
    }

    /// Counts one request as in-flight until the returned guard is dropped.
    #[must_use]
    pub fn in_flight_guard(&self) -> InFlightGuard {
        self.in_flight.fetch_add(1, Ordering::Relaxed);
        InFlightGuard {
            in_flight: Arc::clone(&self.in_flight),
        }
    }

    #[must_use]
    pub fn in_flight_count(&self) -> u64 {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Waits for the in-flight count to reach zero, up to `timeout`.
    ///
    /// Returns `true` and moves to `Stopped` on success. On timeout returns
    /// `false` and leaves the state unchanged. A timeout too large to add to
    /// the current instant waits without a deadline.
    pub async fn wait_for_drain(&self, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now().checked_add(timeout);

        loop {
            if self.in_flight_count() == 0 {
                self.health_state.store(Arc::new(HealthState::Stopped));
                return true;
            }

            if deadline.is_some_and(|d| tokio::time::Instant::now() >= d) {
                return false;
            }

            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

impl Default for ShutdownController {
    fn default() -> Self {
        Self::new()
    }
}

/// Decrements the in-flight counter on drop, including during unwinding.
#[derive(Debug)]
pub struct InFlightGuard {
    in_flight: Arc<AtomicU64>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::Relaxed);
    }
}
