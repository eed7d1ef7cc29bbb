//! least-conn-lb
//!
//! A minimal HTTP load balancer built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                          ┌──────────────────────────────────────────────────┐
//!                          │                  LOAD BALANCER                   │
//!                          │                                                  │
//!     Client Request       │  ┌──────────┐    ┌────────────┐                  │
//!     ─────────────────────┼─▶│   http   │───▶│  selector  │──┐               │
//!                          │  │dispatcher│    │ least-conn │  │ lock          │
//!                          │  └────┬─────┘    └────────────┘  ▼               │
//!                          │       │                  ┌──────────────┐        │
//!                          │       │ release          │  server pool │        │
//!                          │       └─────────────────▶│ (one mutex)  │        │
//!                          │                          └──────────────┘        │
//!                          │                                  ▲ lock per cycle│
//!     Client Response      │  ┌──────────┐             ┌──────┴───────┐       │
//!     ◀────────────────────┼──│dashboard │             │health monitor│───────┼──▶ GET /health
//!                          │  │ / proxy  │             └──────────────┘       │
//!                          │  └──────────┘                                    │
//!                          └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use least_conn_lb::config::load_config;
use least_conn_lb::lifecycle::{signals, startup, Shutdown};
use least_conn_lb::observability::logging;

#[derive(Parser)]
#[command(name = "least-conn-lb")]
#[command(about = "Least-connections HTTP load balancer", long_about = None)]
struct Cli {
    /// Path to the JSON (or .toml) configuration file.
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    logging::init_logging();
    tracing::info!("least-conn-lb v{} starting", env!("CARGO_PKG_VERSION"));

    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(path = ?cli.config, error = %e, "Error loading config file");
            std::process::exit(1);
        }
    };

    tracing::info!(
        port = config.port,
        servers = config.servers.len(),
        health_check_interval_secs = config.health_check_interval,
        release_policy = ?config.release_policy,
        mode = ?config.mode,
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    startup::start(config, &shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
