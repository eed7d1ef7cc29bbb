//! Least Connections load balancing strategy.

use std::cmp::Ordering;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::load_balancer::{backend::BackendServer, LoadBalancer};

/// Least connections selector.
/// Selects a healthy backend with the minimum number of active connections,
/// breaking ties uniformly at random.
#[derive(Debug, Default)]
pub struct LeastConnections;

impl LeastConnections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indices of the healthy backends tied at the lowest connection count,
    /// in pool order. Single pass.
    pub fn candidates(servers: &[BackendServer]) -> Vec<usize> {
        let mut min: Option<usize> = None;
        let mut candidates = Vec::new();

        for (index, server) in servers.iter().enumerate() {
            if !server.is_healthy() {
                continue;
            }
            let connections = server.active_connections();
            match min.map(|m| connections.cmp(&m)) {
                None | Some(Ordering::Less) => {
                    min = Some(connections);
                    candidates.clear();
                    candidates.push(index);
                }
                Some(Ordering::Equal) => candidates.push(index),
                Some(Ordering::Greater) => {}
            }
        }

        candidates
    }

    /// Pick among the tied candidates using `rng`.
    pub fn pick<R: Rng + ?Sized>(&self, servers: &[BackendServer], rng: &mut R) -> Option<usize> {
        Self::candidates(servers).choose(rng).copied()
    }
}

impl LoadBalancer for LeastConnections {
    fn next_server(&self, servers: &[BackendServer]) -> Option<usize> {
        self.pick(servers, &mut rand::thread_rng())
    }
}
