//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check every route parses (method, handler reference, variables)
//! - Validate addresses, locations and value ranges
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DispatcherConfig → Result<(), Vec<ValidationError>>
//! - Structural duplicates are not errors here; registration skips them
//!   with a warning

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::DispatcherConfig;
use crate::dispatch::device::is_full_url;
use crate::routing::{RouteDefinition, RouteError};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("route #{index}: {source}")]
    Route { index: usize, source: RouteError },

    #[error("route #{index}: path {path:?} must start with '/'")]
    RelativePath { index: usize, path: String },

    #[error("invalid bind address {0:?}")]
    BindAddress(String),

    #[error("invalid metrics address {0:?}")]
    MetricsAddress(String),

    #[error("routing.mount_path {0:?} must be empty or start with '/'")]
    MountPath(String),

    #[error("{field} is not a valid URL: {value:?}")]
    Location { field: &'static str, value: String },

    #[error("unknown log level {0:?}")]
    LogLevel(String),

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroTimeout,
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &DispatcherConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    let routing = &config.routing;
    if !routing.mount_path.is_empty() && !routing.mount_path.starts_with('/') {
        errors.push(ValidationError::MountPath(routing.mount_path.clone()));
    }
    for (field, value) in [
        ("routing.default_location", &routing.default_location),
        ("routing.mobile_app", &routing.mobile_app),
    ] {
        if is_full_url(value) && Url::parse(value).is_err() {
            errors.push(ValidationError::Location {
                field,
                value: value.clone(),
            });
        }
    }

    let observability = &config.observability;
    if !LOG_LEVELS.contains(&observability.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ValidationError::LogLevel(observability.log_level.clone()));
    }
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(observability.metrics_address.clone()));
    }

    for (index, route) in config.routes.iter().enumerate() {
        if !route.path.starts_with('/') {
            errors.push(ValidationError::RelativePath {
                index,
                path: route.path.clone(),
            });
        }
        if let Err(source) = RouteDefinition::new(
            &route.method,
            &route.path,
            &route.handler,
            route.args.clone(),
            route.dependencies.clone(),
            route.device,
        ) {
            errors.push(ValidationError::Route { index, source });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::RouteConfig;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&DispatcherConfig::default()), Ok(()));
    }

    #[test]
    fn test_route_errors_carry_index() {
        let mut config = DispatcherConfig::default();
        config.routes.push(RouteConfig::new("GET", "/ok", "Home"));
        config.routes.push(RouteConfig::new("GET", "/a/{id}/{id}", "Home"));
        config.routes.push(RouteConfig::new("GET", "relative", "Home"));

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(matches!(
            &errors[0],
            ValidationError::Route { index: 1, source: RouteError::DuplicateVariable { .. } }
        ));
        assert_eq!(
            errors[1],
            ValidationError::RelativePath {
                index: 2,
                path: "relative".into()
            }
        );
    }

    #[test]
    fn test_settings_checked() {
        let mut config = DispatcherConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.timeouts.request_secs = 0;
        config.routing.mount_path = "app".into();
        config.routing.mobile_app = "https://".into();
        config.observability.log_level = "loud".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.contains(&ValidationError::ZeroTimeout));
        assert!(errors.contains(&ValidationError::Location {
            field: "routing.mobile_app",
            value: "https://".into(),
        }));
    }

    #[test]
    fn test_relative_locations_accepted() {
        let mut config = DispatcherConfig::default();
        config.routing.default_location = "/home".into();
        config.routing.mobile_app = "https://m.example.com/app".into();
        assert!(validate_config(&config).is_ok());
    }
}
