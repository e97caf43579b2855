//! Network module with deferred startup lifecycle.
//!
//! `new()` allocates shared state, `start()` binds the TCP listener, and
//! `serve()` accepts connections until the shutdown future resolves. The
//! split lets callers learn the bound port (and grab the store) before
//! traffic starts flowing.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context as _;
use axum::routing::{any, get};
use axum::Router;
use tokio::net::TcpListener;
use tracing::{info, warn};

use super::config::NetworkConfig;
use super::handlers::{
    explicit_greeting_handler, greeting_handler, health_handler, liveness_handler,
    readiness_handler, AppState,
};
use super::middleware::build_http_layers;
use super::shutdown::ShutdownController;
use crate::context::{spawn_purge_task, ContextStore};

/// Manages the HTTP server lifecycle.
///
/// 1. `new()` -- allocates the context store and shutdown controller
/// 2. `start()` -- binds the TCP listener to the configured address
/// 3. `serve()` -- serves requests until shutdown is signalled, then drains
pub struct NetworkModule {
    config: NetworkConfig,
    listener: Option<TcpListener>,
    store: Arc<ContextStore>,
    shutdown: Arc<ShutdownController>,
}

impl NetworkModule {
    /// Creates a new network module without binding any port.
    #[must_use]
    pub fn new(config: NetworkConfig) -> Self {
        Self {
            config,
            listener: None,
            store: Arc::new(ContextStore::new()),
            shutdown: Arc::new(ShutdownController::new()),
        }
    }

    /// Returns a shared reference to the request context store.
    #[must_use]
    pub fn store(&self) -> Arc<ContextStore> {
        Arc::clone(&self.store)
    }

    /// Returns a shared reference to the shutdown controller.
    #[must_use]
    pub fn shutdown_controller(&self) -> Arc<ShutdownController> {
        Arc::clone(&self.shutdown)
    }

    /// Assembles the axum router with all routes and middleware.
    ///
    /// Routes:
    /// - `/` (any method) -- greeting via request-scoped values
    /// - `/explicit` (any method) -- greeting via a typed request context
    /// - `GET /health`, `GET /health/live`, `GET /health/ready`
    ///
    /// Unmatched paths fall back to the `/` greeting.
    #[must_use]
    pub fn build_router(&self) -> Router {
        let state = AppState {
            store: Arc::clone(&self.store),
            shutdown: Arc::clone(&self.shutdown),
            config: Arc::new(self.config.clone()),
            start_time: Instant::now(),
        };

        let layers = build_http_layers(
            &self.config,
            Arc::clone(&self.store),
            Arc::clone(&self.shutdown),
        );

        Router::new()
            .route("/", any(greeting_handler))
            .route("/explicit", any(explicit_greeting_handler))
            .route("/health", get(health_handler))
            .route("/health/live", get(liveness_handler))
            .route("/health/ready", get(readiness_handler))
            .fallback(greeting_handler)
            .layer(layers)
            .with_state(state)
    }

    /// Binds the TCP listener to the configured host and port.
    ///
    /// Returns the bound port, which differs from the configured one when
    /// port 0 asks the OS for an ephemeral port.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound (e.g., port in use).
    pub async fn start(&mut self) -> anyhow::Result<u16> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        let port = listener.local_addr()?.port();

        info!("TCP listener bound to {}:{}", self.config.host, port);

        self.listener = Some(listener);
        Ok(port)
    }

    /// Serves requests until `shutdown` resolves, then drains.
    ///
    /// After the shutdown future fires:
    /// 1. Health state moves to Draining and the purge task stops
    /// 2. Waits up to `drain_timeout` for in-flight requests
    /// 3. Health state moves to Stopped
    ///
    /// # Errors
    ///
    /// Returns an error if `start()` was not called first or if the server
    /// hits a fatal I/O error.
    pub async fn serve(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> anyhow::Result<()> {
        let router = self.build_router();
        let listener = self
            .listener
            .ok_or_else(|| anyhow::anyhow!("start() must be called before serve()"))?;

        let sweeper = spawn_purge_task(
            Arc::clone(&self.store),
            self.config.effective_context(),
            self.shutdown.shutdown_receiver(),
        );

        self.shutdown.set_ready();
        info!("Serving HTTP connections");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;

        self.shutdown.trigger_shutdown();
        if self.shutdown.wait_for_drain(self.config.drain_timeout).await {
            info!("All requests drained");
        } else {
            warn!(
                in_flight = self.shutdown.in_flight_count(),
                "Drain timeout expired with in-flight requests remaining"
            );
        }

        if let Err(e) = sweeper.await {
            warn!("context purge task ended abnormally: {e}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_config() -> NetworkConfig {
        NetworkConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            ..NetworkConfig::default()
        }
    }

    #[test]
    fn new_creates_module_without_binding() {
        let module = NetworkModule::new(NetworkConfig::default());
        assert!(module.listener.is_none());
    }

    #[test]
    fn store_returns_shared_arc() {
        let module = NetworkModule::new(NetworkConfig::default());
        assert!(Arc::ptr_eq(&module.store(), &module.store()));
    }

    #[test]
    fn shutdown_controller_returns_shared_arc() {
        let module = NetworkModule::new(NetworkConfig::default());
        assert!(Arc::ptr_eq(
            &module.shutdown_controller(),
            &module.shutdown_controller()
        ));
    }

    #[test]
    fn build_router_creates_router() {
        let module = NetworkModule::new(NetworkConfig::default());
        let _router = module.build_router();
    }

    #[tokio::test]
    async fn start_binds_to_os_assigned_port() {
        let mut module = NetworkModule::new(local_config());
        let port = module.start().await.expect("start should succeed");
        assert!(port > 0, "OS-assigned port should be > 0");
        assert!(module.listener.is_some());
    }

    #[tokio::test]
    async fn serve_without_start_is_an_error() {
        let module = NetworkModule::new(local_config());
        let err = module.serve(std::future::ready(())).await.unwrap_err();
        assert!(err.to_string().contains("start() must be called"));
    }

    #[tokio::test]
    async fn serve_drains_and_stops() {
        let mut module = NetworkModule::new(local_config());
        module.start().await.unwrap();
        let shutdown = module.shutdown_controller();

        module.serve(std::future::ready(())).await.unwrap();
        assert_eq!(shutdown.health_state(), crate::network::HealthState::Stopped);
    }
}
