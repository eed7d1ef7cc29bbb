//! Admin status API.
//!
//! # Responsibilities
//! - Report process status
//! - Expose a consistent snapshot of the backend pool
//!
//! Served on its own listener so it never shares the catch-all route.

pub mod handlers;

use std::sync::Arc;

use axum::{routing::get, Router};

use crate::load_balancer::ServerPool;

pub fn router(pool: Arc<ServerPool>) -> Router {
    Router::new()
        .route("/admin/status", get(handlers::get_status))
        .route("/admin/backends", get(handlers::get_backends))
        .with_state(pool)
}
