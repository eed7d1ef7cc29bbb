//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::BalancerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// On-disk configuration syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    /// Pick the format from the file extension; anything but `.toml` is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Json,
        }
    }
}

/// Load and validate configuration from a JSON or TOML file.
pub fn load_config(path: &Path) -> Result<BalancerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content, ConfigFormat::from_path(path))
}

/// Parse and validate configuration text.
pub fn parse_config(content: &str, format: ConfigFormat) -> Result<BalancerConfig, ConfigError> {
    let config: BalancerConfig = match format {
        ConfigFormat::Json => serde_json::from_str(content)?,
        ConfigFormat::Toml => toml::from_str(content)?,
    };

    validate_config(&config).map_err(ConfigError::Validation)?;

    if config.servers.is_empty() {
        tracing::warn!("No backend servers configured; every request will be answered with 503");
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{DispatchMode, ReleasePolicy, ServerConfig};

    #[test]
    fn test_parse_minimal_json() {
        let json = r#"{
            "port": 8080,
            "servers": [
                { "url": "http://localhost:8001", "healthy": true },
                { "url": "http://localhost:8002", "healthy": false, "connections": 3 }
            ],
            "healthCheckInterval": 10
        }"#;

        let config = parse_config(json, ConfigFormat::Json).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.health_check_interval, 10);
        assert_eq!(
            config.servers,
            vec![
                ServerConfig::new("http://localhost:8001").healthy(true),
                ServerConfig::new("http://localhost:8002").connections(3),
            ]
        );
        assert_eq!(config.health_check_path, "/health");
        assert_eq!(config.health_check_timeout, 5);
        assert_eq!(config.release_policy, ReleasePolicy::Immediate);
        assert_eq!(config.mode, DispatchMode::Dashboard);
        assert!(config.template_path.is_none());
        assert!(!config.admin.enabled);
    }

    #[test]
    fn test_parse_toml_with_options() {
        let toml = r#"
            port = 9000
            healthCheckInterval = 2
            releasePolicy = "afterResponse"
            mode = "proxy"

            [[servers]]
            url = "http://127.0.0.1:7001"

            [admin]
            enabled = true
            bindAddress = "127.0.0.1:9001"
        "#;

        let config = parse_config(toml, ConfigFormat::Toml).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.release_policy, ReleasePolicy::AfterResponse);
        assert_eq!(config.mode, DispatchMode::Proxy);
        assert_eq!(config.servers.len(), 1);
        assert!(!config.servers[0].healthy);
        assert!(config.admin.enabled);
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = parse_config("{ \"port\": ", ConfigFormat::Json).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_missing_interval_is_parse_error() {
        let err = parse_config(r#"{ "port": 1, "servers": [] }"#, ConfigFormat::Json).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_negative_connections_rejected() {
        let json = r#"{
            "port": 8080,
            "servers": [{ "url": "http://localhost:8001", "connections": -1 }],
            "healthCheckInterval": 10
        }"#;
        assert!(matches!(
            parse_config(json, ConfigFormat::Json),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_validation_error_surfaces() {
        let json = r#"{ "port": 8080, "servers": [], "healthCheckInterval": 0 }"#;
        let err = parse_config(json, ConfigFormat::Json).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref e) if e.len() == 1));
        assert!(err.to_string().contains("healthCheckInterval"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_config(Path::new("/definitely/not/here/config.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ConfigFormat::from_path(Path::new("lb.toml")), ConfigFormat::Toml);
        assert_eq!(ConfigFormat::from_path(Path::new("config.json")), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("config")), ConfigFormat::Json);
    }
}
