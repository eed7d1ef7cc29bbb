//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, trace, timeout)
//!     → dispatch handler (selector picks backend, reserves slot)
//!     → dashboard.rs (render page) or upstream forward
//!     → slot released per release policy
//!     → Send to client
//! ```

pub mod dashboard;
pub mod server;

pub use dashboard::{Dashboard, RenderError};
pub use server::{AppState, HttpServer};
