//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses and the backend URL
//! - Validate value ranges (timeouts > 0, body limit > 0)
//! - Detect duplicate or malformed routes
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: '{value}' is not a socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("upstream.base_url: '{0}' is not an http URL")]
    InvalidUpstreamUrl(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("routes: route name must not be empty")]
    EmptyRouteName,

    #[error("routes: duplicate route name '{0}'")]
    DuplicateRoute(String),

    #[error("routes.{route}: path '{path}' must start with '/'")]
    RelativePath { route: String, path: String },
}

/// Check a loaded configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(
        "listener.bind_address",
        &config.listener.bind_address,
        &mut errors,
    );
    if config.observability.metrics_enabled {
        check_address(
            "observability.metrics_address",
            &config.observability.metrics_address,
            &mut errors,
        );
    }

    let upstream_ok = Url::parse(&config.upstream.base_url)
        .map(|url| url.scheme() == "http" && url.has_host())
        .unwrap_or(false);
    if !upstream_ok {
        errors.push(ValidationError::InvalidUpstreamUrl(
            config.upstream.base_url.clone(),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    }
    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.upstream_secs"));
    }
    if config.translation.max_body_bytes == 0 {
        errors.push(ValidationError::Zero("translation.max_body_bytes"));
    }

    let mut seen = HashSet::new();
    for route in &config.routes {
        if route.name.trim().is_empty() {
            errors.push(ValidationError::EmptyRouteName);
        } else if !seen.insert(route.name.as_str()) {
            errors.push(ValidationError::DuplicateRoute(route.name.clone()));
        }

        let paths = std::iter::once(&route.path_prefix).chain(route.upstream_path.as_ref());
        for path in paths {
            if !path.starts_with('/') {
                errors.push(ValidationError::RelativePath {
                    route: route.name.clone(),
                    path: path.clone(),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(field: &'static str, value: &str, errors: &mut Vec<ValidationError>) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::RouteConfig;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&GatewayConfig::default()), Ok(()));
    }

    #[test]
    fn test_reports_every_problem() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "localhost".into();
        config.upstream.base_url = "ftp://search.internal".into();
        config.timeouts.upstream_secs = 0;
        config.routes.push(RouteConfig {
            name: "reverse".into(),
            path_prefix: "search".into(),
            upstream_path: None,
            priority: 1,
        });

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::InvalidAddress {
                    field: "listener.bind_address",
                    value: "localhost".into(),
                },
                ValidationError::InvalidUpstreamUrl("ftp://search.internal".into()),
                ValidationError::Zero("timeouts.upstream_secs"),
                ValidationError::DuplicateRoute("reverse".into()),
                ValidationError::RelativePath {
                    route: "reverse".into(),
                    path: "search".into(),
                },
            ]
        );
    }

    #[test]
    fn test_metrics_address_ignored_when_disabled() {
        let mut config = GatewayConfig::default();
        config.observability.metrics_address = "nowhere".into();
        assert!(validate_config(&config).is_err());

        config.observability.metrics_enabled = false;
        assert!(validate_config(&config).is_ok());
    }
}
