//! Greeting handlers.
//!
//! `/` demonstrates ambient request-scoped values: the entry handler stores
//! the user's name and age against the current request, and a separate
//! function reads them back by request identity. `/explicit` produces the
//! same response by passing a typed [`RequestContext`] instead.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use reqscope_core::{RequestContext, RequestId, UserProfile};
use tracing::debug;

use super::AppState;
use crate::context::{ContextError, ContextStore, CurrentRequest};
use crate::network::middleware::REQUEST_ID_HEADER;

pub const USER_KEY: &str = "user";
pub const AGE_KEY: &str = "age";

pub const DEFAULT_USER: &str = "wuyazi";
pub const DEFAULT_AGE: u32 = 21;

/// Entry handler: attaches `user` and `age` to the request, then delegates.
///
/// # Errors
///
/// Propagates [`ContextError`] from [`render_greeting`], which becomes a 500.
pub async fn greeting_handler(
    State(state): State<AppState>,
    CurrentRequest(id): CurrentRequest,
) -> Result<(StatusCode, String), ContextError> {
    state.store.set(id, USER_KEY, DEFAULT_USER);
    state.store.set(id, AGE_KEY, DEFAULT_AGE);

    render_greeting(&state.store, id)
}

/// Reads `user` and `age` for the request and renders the greeting.
///
/// Knows nothing about who set the values; the expected types are asserted
/// here at read time.
///
/// # Errors
///
/// Returns `ContextError::Missing` if either value was never set, and
/// `ContextError::TypeMismatch` if `user` is not a string or `age` is not a
/// non-negative integer.
pub fn render_greeting(
    store: &ContextStore,
    id: RequestId,
) -> Result<(StatusCode, String), ContextError> {
    let user: String = store.require(id, USER_KEY)?;
    let age: u32 = store.require(id, AGE_KEY)?;

    Ok((StatusCode::OK, UserProfile::new(user, age).to_string()))
}

/// Entry handler for the explicit path: builds a typed context and passes it on.
pub async fn explicit_greeting_handler(
    CurrentRequest(id): CurrentRequest,
    headers: HeaderMap,
) -> (StatusCode, String) {
    let trace_id = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let ctx = RequestContext::new(id, trace_id, UserProfile::new(DEFAULT_USER, DEFAULT_AGE));

    render_explicit(&ctx)
}

/// Renders the greeting from an explicitly passed context.
#[must_use]
pub fn render_explicit(ctx: &RequestContext) -> (StatusCode, String) {
    debug!(request_id = %ctx.request_id, trace_id = %ctx.trace_id, "rendering greeting");
    (StatusCode::OK, ctx.profile.to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Instant;

    use super::*;
    use crate::network::{NetworkConfig, ShutdownController};

    const EXPECTED: &str = "the user is wuyazi,age is 21";

    fn test_state() -> AppState {
        AppState {
            store: Arc::new(ContextStore::new()),
            shutdown: Arc::new(ShutdownController::new()),
            config: Arc::new(NetworkConfig::default()),
            start_time: Instant::now(),
        }
    }

    #[tokio::test]
    async fn greeting_handler_sets_then_renders() {
        let state = test_state();
        let guard = state.store.begin();

        let (status, body) = greeting_handler(State(state.clone()), CurrentRequest(guard.id()))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, EXPECTED);

        // Values remain readable until the request's guard is dropped.
        let user: String = state.store.require(guard.id(), USER_KEY).unwrap();
        assert_eq!(user, DEFAULT_USER);
        drop(guard);
        assert!(state.store.is_empty());
    }

    #[test]
    fn render_greeting_uses_stored_values() {
        let store = Arc::new(ContextStore::new());
        let guard = store.begin();
        store.set(guard.id(), USER_KEY, "someone");
        store.set(guard.id(), AGE_KEY, 40);

        let (status, body) = render_greeting(&store, guard.id()).unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "the user is someone,age is 40");
    }

    #[test]
    fn render_greeting_without_values_is_missing() {
        let store = Arc::new(ContextStore::new());
        let guard = store.begin();

        let err = render_greeting(&store, guard.id()).unwrap_err();
        assert!(matches!(err, ContextError::Missing { ref key, .. } if key == USER_KEY));
    }

    #[test]
    fn render_greeting_with_textual_age_is_type_mismatch() {
        let store = Arc::new(ContextStore::new());
        let guard = store.begin();
        store.set(guard.id(), USER_KEY, DEFAULT_USER);
        store.set(guard.id(), AGE_KEY, "21");

        let err = render_greeting(&store, guard.id()).unwrap_err();
        assert!(matches!(err, ContextError::TypeMismatch { ref key, .. } if key == AGE_KEY));
    }

    #[tokio::test]
    async fn explicit_handler_renders_same_body() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, "trace-1".parse().unwrap());

        let (status, body) = explicit_greeting_handler(CurrentRequest(RequestId(1)), headers).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, EXPECTED);
    }

    #[test]
    fn render_explicit_reads_typed_fields() {
        let ctx = RequestContext::new(RequestId(2), "t", UserProfile::new("someone", 40));
        let (_, body) = render_explicit(&ctx);
        assert_eq!(body, "the user is someone,age is 40");
    }
}
