//! HTTP middleware stack for the `reqscope` server.
//!
//! The first layer listed is the outermost: it sees the request first on
//! the way in and the response last on the way out.

use std::sync::Arc;

use axum::http::header::HeaderName;
use axum::http::StatusCode;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::config::NetworkConfig;
use super::shutdown::ShutdownController;
use crate::context::{ContextLayer, ContextStore};

/// Header carrying the client-visible request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// The composed Tower layer type produced by [`build_http_layers`].
type HttpLayers = tower::layer::util::Stack<
    ContextLayer,
    tower::layer::util::Stack<
        PropagateRequestIdLayer,
        tower::layer::util::Stack<
            TimeoutLayer,
            tower::layer::util::Stack<
                TraceLayer<
                    tower_http::classify::SharedClassifier<
                        tower_http::classify::ServerErrorsAsFailures,
                    >,
                >,
                tower::layer::util::Stack<
                    SetRequestIdLayer<MakeRequestUuid>,
                    tower::layer::util::Identity,
                >,
            >,
        >,
    >,
>;

/// Builds the HTTP middleware stack.
///
/// **Ordering (outermost to innermost):**
/// 1. `SetRequestId` -- assigns a UUID v4 `X-Request-Id` unless the client sent one
/// 2. `Tracing` -- structured span per request
/// 3. `Timeout` -- 408 once `request_timeout` elapses
/// 4. `PropagateRequestId` -- copies `X-Request-Id` onto the response
/// 5. `Context` -- allocates the request's store identity and clears it afterwards
#[must_use]
pub fn build_http_layers(
    config: &NetworkConfig,
    store: Arc<ContextStore>,
    shutdown: Arc<ShutdownController>,
) -> HttpLayers {
    let x_request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.request_timeout,
        ))
        .layer(PropagateRequestIdLayer::new(x_request_id))
        .layer(ContextLayer::new(store, shutdown))
        .into_inner()
}
