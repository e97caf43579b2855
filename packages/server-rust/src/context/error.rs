//! Errors raised while reading request-scoped values.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use reqscope_core::{RequestId, ValueTypeError};
use tracing::error;

/// Errors from reading a request's context values.
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("no value stored under {key:?} for {request_id}")]
    Missing { request_id: RequestId, key: String },
    #[error("value under {key:?} for {request_id} has the wrong type: {source}")]
    TypeMismatch {
        request_id: RequestId,
        key: String,
        #[source]
        source: ValueTypeError,
    },
    #[error("request has no context identity; is ContextLayer installed?")]
    MissingRequestId,
}

impl IntoResponse for ContextError {
    fn into_response(self) -> Response {
        error!(error = %self, "request context error");
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_message_names_key_and_request() {
        let err = ContextError::Missing {
            request_id: RequestId(4),
            key: "user".to_string(),
        };
        assert_eq!(err.to_string(), "no value stored under \"user\" for req-4");
    }

    #[test]
    fn into_response_is_internal_server_error() {
        let resp = ContextError::MissingRequestId.into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
