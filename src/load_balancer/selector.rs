//! Backend selection and connection slot accounting.
//!
//! # Responsibilities
//! - Apply the load balancing strategy under the pool lock
//! - Reserve the connection slot inside the same critical section
//! - Hand out a `Reservation` that gives the slot back exactly once

use std::sync::Arc;

use thiserror::Error;

use crate::load_balancer::{least_conn::LeastConnections, pool::ServerPool, LoadBalancer};
use crate::observability::metrics;

/// Selection failure.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SelectError {
    #[error("No healthy servers available")]
    NoHealthyBackend,
}

/// Picks backends from a shared pool.
#[derive(Debug)]
pub struct Selector {
    pool: Arc<ServerPool>,
    strategy: Box<dyn LoadBalancer>,
}

impl Selector {
    /// Least-connections selector over `pool`.
    pub fn new(pool: Arc<ServerPool>) -> Self {
        Self::with_strategy(pool, Box::new(LeastConnections::new()))
    }

    fn with_strategy(pool: Arc<ServerPool>, strategy: Box<dyn LoadBalancer>) -> Self {
        Self { pool, strategy }
    }

    pub fn pool(&self) -> &Arc<ServerPool> {
        &self.pool
    }

    /// Select a backend and reserve one connection slot on it.
    ///
    /// Fails immediately when no backend is healthy; there is no queueing.
    pub async fn acquire(&self) -> Result<Reservation, SelectError> {
        let mut servers = self.pool.lock().await;

        let selected = self
            .strategy
            .next_server(&servers)
            .filter(|&index| index < servers.len());

        let Some(index) = selected else {
            tracing::warn!(pool_size = self.pool.len(), "No healthy servers available");
            metrics::record_no_healthy_backend();
            return Err(SelectError::NoHealthyBackend);
        };

        let server = &mut servers[index];
        server.inc_connections();
        tracing::debug!(
            addr = %server.url(),
            connections = server.active_connections(),
            "Selected server"
        );
        metrics::record_selection(server.url());

        Ok(Reservation {
            pool: Arc::clone(&self.pool),
            index,
            url: server.url().to_string(),
            released: false,
        })
    }
}

/// One reserved connection slot.
///
/// `release` consumes the reservation. A reservation dropped without being
/// released (for example when a request future is cancelled) schedules its
/// release on the current Tokio runtime.
#[derive(Debug)]
#[must_use = "a reservation holds a connection slot until it is released"]
pub struct Reservation {
    pool: Arc<ServerPool>,
    index: usize,
    url: String,
    released: bool,
}

impl Reservation {
    /// URL of the reserved backend.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Position of the reserved backend in the pool.
    pub fn index(&self) -> usize {
        self.index
    }

    pub async fn release(mut self) {
        self.pool.release(self.index).await;
        self.released = true;
    }
}

impl Drop for Reservation {
    fn drop(&mut self) {
        if self.released {
            return;
        }

        let pool = Arc::clone(&self.pool);
        let index = self.index;
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                tracing::debug!(addr = %self.url, "Reservation dropped, releasing in background");
                handle.spawn(async move {
                    pool.release(index).await;
                });
            }
            Err(_) => {
                tracing::warn!(addr = %self.url, "Reservation dropped outside runtime, slot leaked");
            }
        }
    }
}
