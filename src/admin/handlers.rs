use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::load_balancer::{BackendServer, ServerPool};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub pool_size: usize,
}

pub async fn get_status(State(pool): State<Arc<ServerPool>>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        pool_size: pool.len(),
    })
}

/// Every backend with its health flag and connection count, read under the pool lock.
pub async fn get_backends(State(pool): State<Arc<ServerPool>>) -> Json<Vec<BackendServer>> {
    Json(pool.snapshot().await)
}
