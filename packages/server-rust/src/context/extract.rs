//! Axum extractor for the identity assigned by [`ContextLayer`](super::ContextLayer).

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use reqscope_core::RequestId;

use super::error::ContextError;

/// Extracts the [`RequestId`] of the request being handled.
///
/// Rejects with [`ContextError::MissingRequestId`] when the route is not
/// wrapped by `ContextLayer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentRequest(pub RequestId);

impl<S> FromRequestParts<S> for CurrentRequest
where
    S: Send + Sync,
{
    type Rejection = ContextError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestId>()
            .copied()
            .map(CurrentRequest)
            .ok_or(ContextError::MissingRequestId)
    }
}
