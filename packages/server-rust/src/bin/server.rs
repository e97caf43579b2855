//! reqscope server binary.
//!
//! Usage:
//!   reqscope-server                         # 0.0.0.0:1234
//!   reqscope-server --port 8080             # custom port
//!   reqscope-server --log-format json       # structured logs
//!
//! Every flag can also be set through its `REQSCOPE_*` environment variable.

use std::time::Duration;

use clap::{Parser, ValueEnum};
use reqscope_server::network::{ContextConfig, NetworkConfig, DEFAULT_PORT};
use reqscope_server::NetworkModule;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "reqscope-server", about = "HTTP server demonstrating request-scoped values")]
struct Cli {
    /// Address to bind to
    #[arg(long, env = "REQSCOPE_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on (0 for OS-assigned)
    #[arg(long, env = "REQSCOPE_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Per-request timeout in seconds
    #[arg(long, env = "REQSCOPE_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    request_timeout_secs: u64,

    /// Seconds to wait for in-flight requests on shutdown
    #[arg(long, env = "REQSCOPE_DRAIN_TIMEOUT_SECS", default_value_t = 30)]
    drain_timeout_secs: u64,

    /// Request contexts older than this many seconds are purged
    #[arg(long, env = "REQSCOPE_CONTEXT_MAX_AGE_SECS", default_value_t = 300)]
    context_max_age_secs: u64,

    /// Seconds between context purge runs
    #[arg(long, env = "REQSCOPE_PURGE_INTERVAL_SECS", default_value_t = 60)]
    purge_interval_secs: u64,

    /// Log output format
    #[arg(long, env = "REQSCOPE_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

impl Cli {
    fn network_config(&self) -> NetworkConfig {
        NetworkConfig {
            host: self.host.clone(),
            port: self.port,
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            drain_timeout: Duration::from_secs(self.drain_timeout_secs),
            context: ContextConfig {
                max_age: Duration::from_secs(self.context_max_age_secs),
                purge_interval: Duration::from_secs(self.purge_interval_secs),
            },
        }
    }
}

/// Installs the global subscriber. `RUST_LOG` overrides the `info` default.
fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to install Ctrl+C handler: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let mut module = NetworkModule::new(cli.network_config());
    let port = module.start().await?;
    info!(port, "reqscope server listening");

    module.serve(shutdown_signal()).await?;
    info!("Server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_network_config() {
        let cli = Cli::try_parse_from(["reqscope-server"]).unwrap();
        let config = cli.network_config();
        let defaults = NetworkConfig::default();

        assert_eq!(config.host, defaults.host);
        assert_eq!(config.port, 1234);
        assert_eq!(config.request_timeout, defaults.request_timeout);
        assert_eq!(config.context.max_age, defaults.context.max_age);
        assert_eq!(cli.log_format, LogFormat::Pretty);
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "reqscope-server",
            "--port",
            "8080",
            "--purge-interval-secs",
            "5",
            "--log-format",
            "json",
        ])
        .unwrap();
        let config = cli.network_config();

        assert_eq!(config.port, 8080);
        assert_eq!(config.context.purge_interval, Duration::from_secs(5));
        assert_eq!(cli.log_format, LogFormat::Json);
    }
}
