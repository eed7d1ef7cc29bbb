//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Active health checks (active.rs):
//!     Sleep for the configured interval
//!     → Lock the pool
//!     → Probe each backend in order
//!     → Overwrite its healthy flag with the outcome
//!     → Unlock
//! ```
//!
//! # Design Decisions
//! - No hysteresis: one failed probe marks a backend unhealthy, one success heals it
//! - Probe errors never stop the loop and are never retried within a cycle
//! - The loop only ends on process shutdown

pub mod active;

pub use active::{HealthMonitor, ProbeOutcome};
