//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single backend server
//! - Track active connections (for Least Connections LB)
//! - Track health state (most recent probe outcome)
//!
//! Records carry no synchronization of their own; every access goes through
//! the pool lock.

use serde::Serialize;

use crate::config::ServerConfig;

/// A single backend server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendServer {
    /// Base URL, immutable after load.
    url: String,
    /// Outcome of the most recent health probe.
    healthy: bool,
    /// Number of currently reserved connection slots.
    active_connections: usize,
}

impl BackendServer {
    /// Create a new backend.
    pub fn new(url: impl Into<String>, healthy: bool, active_connections: usize) -> Self {
        Self {
            url: url.into(),
            healthy,
            active_connections,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_healthy(&self) -> bool {
        self.healthy
    }

    /// Get the current number of active connections.
    pub fn active_connections(&self) -> usize {
        self.active_connections
    }

    /// Record a probe outcome. Returns true if the flag changed.
    pub(crate) fn set_healthy(&mut self, healthy: bool) -> bool {
        let changed = self.healthy != healthy;
        self.healthy = healthy;
        changed
    }

    /// Increment active connection count.
    pub(crate) fn inc_connections(&mut self) {
        self.active_connections += 1;
    }

    /// Decrement active connection count. Returns false, leaving the count at
    /// zero, when there was nothing to release.
    pub(crate) fn dec_connections(&mut self) -> bool {
        match self.active_connections.checked_sub(1) {
            Some(n) => {
                self.active_connections = n;
                true
            }
            None => false,
        }
    }
}

impl From<&ServerConfig> for BackendServer {
    fn from(config: &ServerConfig) -> Self {
        Self::new(config.url.clone(), config.healthy, config.connections)
    }
}
