//! Startup orchestration.
//!
//! Order: metrics exporter, admin listener, main listener, then the HTTP
//! server (which starts the health monitor). Any bind error is fatal.

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::admin;
use crate::config::BalancerConfig;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

async fn bind(address: &str) -> Result<TcpListener, StartupError> {
    TcpListener::bind(address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.to_string(),
            source,
        })
}

/// Start every subsystem and serve until `shutdown` fires.
pub async fn start(config: BalancerConfig, shutdown: &Shutdown) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let server = HttpServer::new(config);

    if server.config().admin.enabled {
        let listener = bind(&server.config().admin.bind_address).await?;
        let app = admin::router(server.pool());
        let mut admin_shutdown = shutdown.subscribe();
        tracing::info!(address = %server.config().admin.bind_address, "Admin API listening");
        tokio::spawn(async move {
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = admin_shutdown.recv().await;
                })
                .await;
            if let Err(e) = result {
                tracing::error!(error = %e, "Admin API stopped");
            }
        });
    }

    let listener = bind(&server.config().bind_address()).await?;
    tracing::info!(
        port = server.config().port,
        servers = server.config().servers.len(),
        "Load balancer started"
    );

    server.run(listener, shutdown.subscribe()).await?;
    Ok(())
}
