//! Active health checking.
//!
//! # Responsibilities
//! - Periodically probe every backend in pool order
//! - Update each backend's health flag from the latest probe only
//!
//! The pool lock is held for a whole cycle, so probes run one after another
//! and selections wait until the cycle ends. Cycle time is the sum of the
//! probe latencies, bounded per probe by the configured timeout.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time;

use crate::config::BalancerConfig;
use crate::load_balancer::pool::ServerPool;
use crate::observability::metrics;

/// Result of a single probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The backend answered 200.
    Healthy,
    /// The backend answered with another status.
    Status(StatusCode),
    /// Connection refused, reset, or any other transport failure.
    Transport(String),
    /// No response within the probe timeout.
    Timeout,
    /// The probe URL could not be built.
    InvalidUri(String),
}

impl ProbeOutcome {
    pub fn is_healthy(&self) -> bool {
        matches!(self, ProbeOutcome::Healthy)
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeOutcome::Healthy => write!(f, "healthy"),
            ProbeOutcome::Status(status) => write!(f, "non-success status {}", status),
            ProbeOutcome::Transport(e) => write!(f, "connection error: {}", e),
            ProbeOutcome::Timeout => write!(f, "timeout"),
            ProbeOutcome::InvalidUri(e) => write!(f, "invalid probe uri: {}", e),
        }
    }
}

pub struct HealthMonitor {
    pool: Arc<ServerPool>,
    interval: Duration,
    timeout: Duration,
    path: String,
    client: Client<HttpConnector, Body>,
}

impl HealthMonitor {
    pub fn new(pool: Arc<ServerPool>, config: &BalancerConfig) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        Self {
            pool,
            interval: config.health_check_interval(),
            timeout: config.health_check_timeout(),
            path: config.health_check_path.clone(),
            client,
        }
    }

    /// Run the monitor on its own task.
    pub fn spawn(self, shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    /// Probe, sleep, repeat until shutdown. The first cycle starts immediately.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            interval_secs = self.interval.as_secs(),
            path = %self.path,
            "Health monitor starting"
        );

        loop {
            self.run_cycle().await;

            tokio::select! {
                _ = time::sleep(self.interval) => {}
                _ = shutdown.recv() => {
                    tracing::info!("Health monitor received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// One full cycle: lock the pool, probe every backend, release the lock.
    pub async fn run_cycle(&self) {
        let mut servers = self.pool.lock().await;
        tracing::debug!(servers = servers.len(), "Performing health checks");

        for server in servers.iter_mut() {
            let outcome = self.probe(server.url()).await;
            let healthy = outcome.is_healthy();

            if healthy {
                tracing::debug!(addr = %server.url(), "Server is healthy");
            } else {
                tracing::warn!(addr = %server.url(), reason = %outcome, "Server is unhealthy");
            }

            if server.set_healthy(healthy) {
                tracing::info!(addr = %server.url(), healthy, "Backend health changed");
            }

            metrics::record_backend_health(server.url(), healthy);
        }
    }

    /// Issue one `GET <base_url><path>` and classify the result.
    pub async fn probe(&self, base_url: &str) -> ProbeOutcome {
        let uri = format!("{}{}", base_url.trim_end_matches('/'), self.path);

        let request = match Request::builder()
            .method("GET")
            .uri(uri)
            .header("user-agent", "least-conn-lb-health-check")
            .body(Body::empty())
        {
            Ok(req) => req,
            Err(e) => return ProbeOutcome::InvalidUri(e.to_string()),
        };

        match time::timeout(self.timeout, self.client.request(request)).await {
            Ok(Ok(response)) if response.status() == StatusCode::OK => ProbeOutcome::Healthy,
            Ok(Ok(response)) => ProbeOutcome::Status(response.status()),
            Ok(Err(e)) => ProbeOutcome::Transport(e.to_string()),
            Err(_) => ProbeOutcome::Timeout,
        }
    }
}
