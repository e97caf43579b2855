//! Tower middleware that gives every request a context identity.
//!
//! For each request the layer allocates a [`RequestId`] from the store,
//! inserts it into the request extensions, counts the request as in-flight,
//! and clears the request's values once the inner service has produced a
//! response.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::http::Request;
use reqscope_core::RequestId;
use tower::{Layer, Service};

use super::store::ContextStore;
use crate::network::ShutdownController;

// ---------------------------------------------------------------------------
// ContextLayer
// ---------------------------------------------------------------------------

/// Tower layer that wraps services with request context bookkeeping.
#[derive(Debug, Clone)]
pub struct ContextLayer {
    store: Arc<ContextStore>,
    shutdown: Arc<ShutdownController>,
}

impl ContextLayer {
    #[must_use]
    pub fn new(store: Arc<ContextStore>, shutdown: Arc<ShutdownController>) -> Self {
        Self { store, shutdown }
    }
}

impl<S> Layer<S> for ContextLayer {
    type Service = ContextService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ContextService {
            inner,
            store: Arc::clone(&self.store),
            shutdown: Arc::clone(&self.shutdown),
        }
    }
}

// ---------------------------------------------------------------------------
// ContextService
// ---------------------------------------------------------------------------

/// Service wrapper that opens and clears a request context around each call.
#[derive(Debug, Clone)]
pub struct ContextService<S> {
    inner: S,
    store: Arc<ContextStore>,
    shutdown: Arc<ShutdownController>,
}

impl<S, B> Service<Request<B>> for ContextService<S>
where
    S: Service<Request<B>> + Send,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<S::Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<B>) -> Self::Future {
        let guard = self.store.begin();
        let in_flight = self.shutdown.in_flight_guard();
        req.extensions_mut().insert::<RequestId>(guard.id());

        let fut = self.inner.call(req);
        Box::pin(async move {
            let result = fut.await;
            // Response is built; the request's values are no longer reachable.
            drop(guard);
            drop(in_flight);
            result
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
