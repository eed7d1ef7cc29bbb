//! Backend pool management.
//!
//! # Responsibilities
//! - Own the fixed, ordered list of backends
//! - Serialize every read and write behind one exclusive lock
//! - Give back connection slots
//!
//! The lock is async because the health monitor holds it across its probes.
//! Whole-pool locking only: there is no way to lock a single backend.

use std::ops::{Deref, DerefMut};

use tokio::sync::{Mutex, MutexGuard};

use crate::config::ServerConfig;
use crate::load_balancer::backend::BackendServer;

/// The shared registry of backend servers.
#[derive(Debug)]
pub struct ServerPool {
    servers: Mutex<Vec<BackendServer>>,
    len: usize,
}

/// Exclusive access to the whole pool, released on drop.
///
/// Derefs to a slice so holders can mutate backends but never resize the pool.
#[derive(Debug)]
pub struct PoolGuard<'a> {
    guard: MutexGuard<'a, Vec<BackendServer>>,
}

impl Deref for PoolGuard<'_> {
    type Target = [BackendServer];

    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}

impl DerefMut for PoolGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.guard
    }
}

impl ServerPool {
    pub fn new(servers: Vec<BackendServer>) -> Self {
        let len = servers.len();
        Self {
            servers: Mutex::new(servers),
            len,
        }
    }

    /// Build the pool from configuration, keeping the configured order.
    pub fn from_config(configs: &[ServerConfig]) -> Self {
        Self::new(configs.iter().map(BackendServer::from).collect())
    }

    /// Acquire the pool lock.
    pub async fn lock(&self) -> PoolGuard<'_> {
        PoolGuard {
            guard: self.servers.lock().await,
        }
    }

    /// Run `f` with the pool locked.
    pub async fn with_servers<R>(&self, f: impl FnOnce(&mut [BackendServer]) -> R) -> R {
        let mut guard = self.lock().await;
        f(&mut guard)
    }

    /// A consistent copy of every backend, taken under the lock.
    pub async fn snapshot(&self) -> Vec<BackendServer> {
        self.with_servers(|servers| servers.to_vec()).await
    }

    /// Give back one connection slot on the backend at `index`.
    ///
    /// Returns false if the backend had no slot to give back; the count stays
    /// at zero.
    pub async fn release(&self, index: usize) -> bool {
        self.with_servers(|servers| match servers.get_mut(index) {
            Some(server) => {
                if server.dec_connections() {
                    tracing::debug!(
                        addr = %server.url(),
                        connections = server.active_connections(),
                        "Connection slot released"
                    );
                    true
                } else {
                    tracing::warn!(addr = %server.url(), "Release with no active connections");
                    false
                }
            }
            None => {
                tracing::warn!(index, "Release for unknown backend index");
                false
            }
        })
        .await
    }

    /// Number of backends. Fixed for the pool's lifetime.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
