//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → selector.rs (lock the pool)
//!     → least_conn.rs (healthy backends tied at fewest connections, random pick)
//!     → backend.rs (reserve a connection slot)
//!     → Reservation returned, or NoHealthyBackend
//!
//! Dispatcher done (or policy says "now")
//!     → Reservation::release
//!     → pool.rs (decrement under the lock, floored at zero)
//! ```
//!
//! # Design Decisions
//! - Strategies are stateless; the pool tracks connections
//! - One lock for the whole pool, shared with the health monitor
//! - Unhealthy backends excluded from selection
//! - Selection and reservation happen in one critical section

pub mod backend;
pub mod least_conn;
pub mod pool;
pub mod selector;

pub use backend::BackendServer;
pub use least_conn::LeastConnections;
pub use pool::{PoolGuard, ServerPool};
pub use selector::{Reservation, SelectError, Selector};

/// A backend selection strategy.
///
/// Called with the pool locked; returns the index of the chosen backend.
pub trait LoadBalancer: Send + Sync + std::fmt::Debug {
    fn next_server(&self, servers: &[BackendServer]) -> Option<usize>;
}
