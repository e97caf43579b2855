//! Network configuration types for the `reqscope` server.

use std::time::Duration;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 1234;

/// Top-level network configuration for the server.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Bind address for the server.
    pub host: String,
    /// Port to listen on. 0 means OS-assigned.
    pub port: u16,
    /// Maximum time to wait for a request to complete.
    pub request_timeout: Duration,
    /// How long graceful shutdown waits for in-flight requests.
    pub drain_timeout: Duration,
    /// Request context lifetime settings.
    pub context: ContextConfig,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            request_timeout: Duration::from_secs(30),
            drain_timeout: Duration::from_secs(30),
            context: ContextConfig::default(),
        }
    }
}

impl NetworkConfig {
    /// Context settings actually used by the purge task.
    ///
    /// A non-zero `max_age` is raised to at least `request_timeout`, so an
    /// entry cannot be purged while its request may still be running. Zero
    /// is kept as is and disables purging.
    #[must_use]
    pub fn effective_context(&self) -> ContextConfig {
        let mut context = self.context;
        if !context.max_age.is_zero() {
            context.max_age = context.max_age.max(self.request_timeout);
        }
        context
    }
}

/// Controls how long request contexts may live in the store.
#[derive(Debug, Clone, Copy)]
pub struct ContextConfig {
    /// Entries older than this are removed by the purge task.
    pub max_age: Duration,
    /// Interval between purge runs.
    pub purge_interval: Duration,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_age: Duration::from_secs(300),
            purge_interval: Duration::from_secs(60),
        }
    }
}
