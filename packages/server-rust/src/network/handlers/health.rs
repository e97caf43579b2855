//! Health, liveness, and readiness endpoint handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::json;

use super::AppState;
use crate::network::HealthState;

/// Returns health details as JSON.
///
/// Always 200; the `state` field tells monitoring whether the server is
/// ready, draining, or still starting.
pub async fn health_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "state": state.shutdown.health_state().as_str(),
        "active_contexts": state.store.len(),
        "in_flight": state.shutdown.in_flight_count(),
        "uptime_secs": state.start_time.elapsed().as_secs(),
        "context_max_age_secs": state.config.context.max_age.as_secs(),
    }))
}

/// Liveness probe: the process is up and answering.
pub async fn liveness_handler() -> StatusCode {
    StatusCode::OK
}

/// Readiness probe: 200 only in the `Ready` state, 503 otherwise.
pub async fn readiness_handler(State(state): State<AppState>) -> StatusCode {
    if state.shutdown.health_state() == HealthState::Ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
