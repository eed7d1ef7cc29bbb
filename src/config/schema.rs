//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the balancer.
//! All types derive Serde traits for deserialization from config files.
//! Keys are camelCase so existing `config.json` files load unchanged.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the load balancer.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalancerConfig {
    /// Port to listen on (all interfaces).
    pub port: u16,

    /// Ordered list of backend servers. The pool keeps this order.
    pub servers: Vec<ServerConfig>,

    /// Seconds to sleep between two health check cycles.
    pub health_check_interval: u64,

    /// Path probed on every backend.
    #[serde(default = "default_health_check_path")]
    pub health_check_path: String,

    /// Per-probe timeout in seconds.
    #[serde(default = "default_health_check_timeout")]
    pub health_check_timeout: u64,

    /// Total time allowed for one inbound request, in seconds.
    ///
    /// Unset by default: a request waits for any health cycle in progress.
    /// When set it must exceed the longest possible cycle.
    #[serde(default)]
    pub request_timeout: Option<u64>,

    /// When the dispatcher hands the connection slot back.
    #[serde(default)]
    pub release_policy: ReleasePolicy,

    /// What the dispatcher does with the selected backend.
    #[serde(default)]
    pub mode: DispatchMode,

    /// HTML template for the dashboard. Built-in page when absent.
    #[serde(default)]
    pub template_path: Option<PathBuf>,

    #[serde(default)]
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub admin: AdminConfig,
}

impl BalancerConfig {
    /// Create a config with the given port and servers, every optional field at its default.
    pub fn new(port: u16, servers: Vec<ServerConfig>, health_check_interval: u64) -> Self {
        Self {
            port,
            servers,
            health_check_interval,
            health_check_path: default_health_check_path(),
            health_check_timeout: default_health_check_timeout(),
            request_timeout: None,
            release_policy: ReleasePolicy::default(),
            mode: DispatchMode::default(),
            template_path: None,
            observability: ObservabilityConfig::default(),
            admin: AdminConfig::default(),
        }
    }

    pub fn health_check_interval(&self) -> Duration {
        Duration::from_secs(self.health_check_interval)
    }

    pub fn health_check_timeout(&self) -> Duration {
        Duration::from_secs(self.health_check_timeout)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout.map(Duration::from_secs)
    }

    /// Upper bound on one health cycle: every probe hitting its timeout.
    pub fn worst_case_cycle(&self) -> Duration {
        self.health_check_timeout() * self.servers.len() as u32
    }

    /// Address the main listener binds to.
    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

fn default_health_check_path() -> String {
    "/health".to_string()
}

fn default_health_check_timeout() -> u64 {
    5
}

/// Backend server descriptor.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ServerConfig {
    /// Base URL of the backend (e.g. "http://localhost:8001").
    pub url: String,

    /// Health assumed until the first probe completes.
    #[serde(default)]
    pub healthy: bool,

    /// Initial connection count.
    #[serde(default)]
    pub connections: usize,
}

impl ServerConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            healthy: false,
            connections: 0,
        }
    }

    pub fn healthy(mut self, healthy: bool) -> Self {
        self.healthy = healthy;
        self
    }

    pub fn connections(mut self, connections: usize) -> Self {
        self.connections = connections;
        self
    }
}

/// When a reserved connection slot is handed back.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ReleasePolicy {
    /// Release right after selection, before any downstream work.
    #[default]
    Immediate,
    /// Release once rendering or forwarding has completed.
    AfterResponse,
}

/// What the dispatcher does with the selected backend.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum DispatchMode {
    /// Render an HTML page naming the selected backend.
    #[default]
    Dashboard,
    /// Forward the request to the selected backend.
    Proxy,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ObservabilityConfig {
    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin status listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AdminConfig {
    /// Enable the admin listener.
    pub enabled: bool,

    /// Admin listener bind address.
    pub bind_address: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bind_address: "127.0.0.1:8081".to_string(),
        }
    }
}
