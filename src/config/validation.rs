//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate backend URLs (absolute, plain http)
//! - Validate value ranges (intervals and timeouts > 0)
//! - Keep an optional request timeout above the worst-case health cycle
//! - Validate optional listener addresses when their feature is enabled
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BalancerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::BalancerConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("server #{index}: invalid url {url:?}: {reason}")]
    InvalidServerUrl {
        index: usize,
        url: String,
        reason: String,
    },

    #[error("server #{index}: unsupported scheme {scheme:?} (only http is supported)")]
    UnsupportedScheme { index: usize, scheme: String },

    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },

    #[error(
        "requestTimeout ({request_timeout}s) must exceed the worst-case health cycle ({cycle}s)"
    )]
    TimeoutBelowHealthCycle { request_timeout: u64, cycle: u64 },

    #[error("healthCheckPath {0:?} must start with '/'")]
    InvalidHealthPath(String),

    #[error("{field}: invalid socket address {value:?}")]
    InvalidAddress { field: &'static str, value: String },
}

/// Check every semantic constraint, collecting all failures.
pub fn validate_config(config: &BalancerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for (index, server) in config.servers.iter().enumerate() {
        match Url::parse(&server.url) {
            Ok(url) if url.scheme() != "http" => errors.push(ValidationError::UnsupportedScheme {
                index,
                scheme: url.scheme().to_string(),
            }),
            Ok(url) if url.host_str().is_none() => errors.push(ValidationError::InvalidServerUrl {
                index,
                url: server.url.clone(),
                reason: "missing host".to_string(),
            }),
            Ok(_) => {}
            Err(e) => errors.push(ValidationError::InvalidServerUrl {
                index,
                url: server.url.clone(),
                reason: e.to_string(),
            }),
        }
    }

    if config.health_check_interval == 0 {
        errors.push(ValidationError::NotPositive { field: "healthCheckInterval" });
    }
    if config.health_check_timeout == 0 {
        errors.push(ValidationError::NotPositive { field: "healthCheckTimeout" });
    }
    match config.request_timeout {
        Some(0) => errors.push(ValidationError::NotPositive { field: "requestTimeout" }),
        Some(request_timeout) => {
            // Selections wait behind a running cycle.
            let cycle = config.worst_case_cycle().as_secs();
            if request_timeout <= cycle {
                errors.push(ValidationError::TimeoutBelowHealthCycle {
                    request_timeout,
                    cycle,
                });
            }
        }
        None => {}
    }
    if !config.health_check_path.starts_with('/') {
        errors.push(ValidationError::InvalidHealthPath(config.health_check_path.clone()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metricsAddress",
            value: config.observability.metrics_address.clone(),
        });
    }
    if config.admin.enabled && config.admin.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "admin.bindAddress",
            value: config.admin.bind_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
