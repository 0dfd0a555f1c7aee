//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<GatewayConfig, ConfigError> {
    let config: GatewayConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::LogFormat;
    use crate::geocoding::MissingFeatures;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.routes.len(), 1);
        assert_eq!(config.routes[0].path_prefix, "/maps/api/geocode/json");
        assert_eq!(config.translation.missing_features, MissingFeatures::Reject);
    }

    #[test]
    fn test_full_file() {
        let config = parse_config(
            r#"
            [listener]
            bind_address = "127.0.0.1:9000"

            [upstream]
            base_url = "http://pelias-api:4000"

            [timeouts]
            upstream_secs = 3

            [[routes]]
            name = "reverse"
            path_prefix = "/maps/api/geocode/json"
            upstream_path = "/v1/reverse"

            [[routes]]
            name = "search"
            path_prefix = "/maps/api/place/textsearch/json"
            upstream_path = "/v1/search"
            priority = 5

            [translation]
            missing_features = "empty"

            [translation.plus_code]
            compound_code = "CWC8+R9 Mountain View"
            global_code = "849VCWC8+R9"

            [observability]
            log_format = "json"
            metrics_enabled = false
            "#,
        )
        .unwrap();

        assert_eq!(config.upstream.base_url, "http://pelias-api:4000");
        assert_eq!(config.timeouts.upstream_secs, 3);
        assert_eq!(config.timeouts.request_secs, 30);
        assert_eq!(config.routes.len(), 2);
        assert_eq!(config.routes[1].priority, 5);
        assert_eq!(config.translation.missing_features, MissingFeatures::Empty);
        assert_eq!(config.translation.plus_code.global_code, "849VCWC8+R9");
        assert_eq!(config.observability.log_format, LogFormat::Json);
    }

    #[test]
    fn test_rejects_unknown_policy() {
        let err = parse_config("[translation]\nmissing_features = \"ignore\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_errors_surface() {
        let err = parse_config("[timeouts]\nrequest_secs = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref v) if v.len() == 1));
        assert!(err.to_string().contains("timeouts.request_secs"));
    }
}
