//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! dispatcher. All types derive Serde traits for deserialization from
//! config files.

use serde::{Deserialize, Serialize};

use crate::routing::{DevicePolicy, HandlerArgs};

/// Root configuration for the dispatcher.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Listener configuration (bind address, body limit).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Fallback, mount path and mobile redirection settings.
    pub routing: RoutingConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Route definitions, in match order.
    pub routes: Vec<RouteConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Total time allowed for one request, handler included, in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// What to do when no route matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotFoundPolicy {
    /// Redirect to `default_location`.
    #[default]
    Redirect,
    /// Return a structured 404 condition.
    Error,
}

/// Dispatch behaviour outside of the route table itself.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Script path the dispatcher is mounted under (e.g. "/app/index.php").
    /// Its common prefix with each request path is stripped before matching.
    pub mount_path: String,

    /// Redirect target when nothing matches (path or full URL).
    pub default_location: String,

    /// Base location of the mobile application (path or full URL).
    pub mobile_app: String,

    /// Consult the mobile detector for `auto` routes.
    pub mobile_detection: bool,

    /// Redirect or 404 when nothing matches.
    pub not_found: NotFoundPolicy,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            mount_path: String::new(),
            default_location: "/".to_string(),
            mobile_app: "/m".to_string(),
            mobile_detection: false,
            not_found: NotFoundPolicy::Redirect,
        }
    }
}

/// One route entry.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// HTTP method (case-insensitive).
    pub method: String,

    /// Pattern such as "/user/{id}".
    pub path: String,

    /// Handler reference: "Name" or "Name:action".
    pub handler: String,

    /// Static arguments handed to the handler.
    #[serde(default = "default_args")]
    pub args: HandlerArgs,

    /// Dependencies resolved for action handlers, in order.
    #[serde(default)]
    pub dependencies: Vec<String>,

    /// Mobile redirection policy.
    #[serde(default)]
    pub device: DevicePolicy,
}

impl RouteConfig {
    /// Convenience constructor with empty args, no dependencies and the
    /// default device policy.
    pub fn new(method: &str, path: &str, handler: &str) -> Self {
        Self {
            method: method.to_string(),
            path: path.to_string(),
            handler: handler.to_string(),
            args: default_args(),
            dependencies: Vec::new(),
            device: DevicePolicy::default(),
        }
    }
}

fn default_args() -> HandlerArgs {
    HandlerArgs::Object(Default::default())
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
