//! Startup orchestration.
//!
//! # Design Decisions
//! - Fail fast: config and bind errors are fatal
//! - A missing access key is not fatal; the relay reports it per request
//! - The listener binds last (traffic only when ready)

use std::net::SocketAddr;

use tokio::net::TcpListener;

use crate::config::RelayConfig;
use crate::http::HttpServer;
use crate::lifecycle::shutdown::ShutdownSignal;
use crate::observability::metrics;

/// Bind the listener and serve until shutdown.
pub async fn run(
    config: RelayConfig,
    shutdown: ShutdownSignal,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        bind_address = %config.listener.bind_address,
        endpoint = %config.upstream.endpoint,
        max_body_size = config.listener.max_body_size,
        static_files = config.static_files.enabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let server = HttpServer::new(config)?;

    let listener = TcpListener::bind(&server.config().listener.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        "Server running"
    );

    server.run(listener, shutdown).await?;
    Ok(())
}
