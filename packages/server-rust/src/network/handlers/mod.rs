//! HTTP handler definitions for the `reqscope` server.
//!
//! Defines `AppState`, the shared state carried through axum extractors,
//! and re-exports the handler functions used when building the router.

pub mod greeting;
pub mod health;

pub use greeting::{explicit_greeting_handler, greeting_handler};
pub use health::{health_handler, liveness_handler, readiness_handler};

use std::sync::Arc;
use std::time::Instant;

use super::{NetworkConfig, ShutdownController};
use crate::context::ContextStore;

/// Shared application state passed to handlers via `State` extraction.
///
/// Holds `Arc` references so cloning per request is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Request-scoped values, keyed by the identity `ContextLayer` assigns.
    pub store: Arc<ContextStore>,
    /// Health state and in-flight tracking.
    pub shutdown: Arc<ShutdownController>,
    pub config: Arc<NetworkConfig>,
    /// Used for the uptime reported by `/health`.
    pub start_time: Instant,
}
