//! Route lookup and redirect policy.
//!
//! # Responsibilities
//! - Own the route table and the routing settings
//! - Resolve a normalized request to an invocation, a redirect or a 404
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Pure: never invokes handlers, so tools can trace resolution offline
//! - Explicit NotFound rather than silent default when configured

use axum::body::Bytes;

use crate::config::{NotFoundPolicy, RoutingConfig};
use crate::dispatch::device::{deflection, resolve_location, DeviceSignal};
use crate::dispatch::request::NormalizedRequest;
use crate::routing::{find, MatchResult, RouteDefinition, RouteNotFound, RouteTable, VariableBindings};

/// How a request resolves, before any handler runs.
#[derive(Debug)]
pub enum Resolution<'r> {
    /// Call the route's handler with these bindings.
    Invoke {
        route: &'r RouteDefinition,
        bindings: VariableBindings,
    },
    /// Matched, but the client goes to the mobile application.
    Deflect(String),
    /// Nothing matched; redirect to the default location.
    Fallback(String),
    /// Nothing matched; report a 404.
    NotFound(RouteNotFound),
}

impl Resolution<'_> {
    /// Short label used in logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Resolution::Invoke { .. } => "invoked",
            Resolution::Deflect(_) => "deflected",
            Resolution::Fallback(_) => "fallback",
            Resolution::NotFound(_) => "not_found",
        }
    }
}

/// Route table plus the settings that govern redirects.
#[derive(Debug, Clone)]
pub struct Router {
    table: RouteTable,
    config: RoutingConfig,
}

impl Router {
    pub fn new(table: RouteTable, config: RoutingConfig) -> Self {
        Self { table, config }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    /// Normalize a raw request against the configured mount path.
    pub fn normalize(&self, method: &str, target: &str, body: impl Into<Bytes>) -> NormalizedRequest {
        NormalizedRequest::new(method, target, &self.config.mount_path, body)
    }

    /// Resolve `request`. `signal` is consulted only for `auto` routes when
    /// mobile detection is enabled.
    pub fn resolve<'r>(&'r self, request: &NormalizedRequest, signal: &dyn DeviceSignal) -> Resolution<'r> {
        match find(self.table.all(), request.segments()) {
            MatchResult::Matched { route, bindings } => {
                match deflection(route.device(), request, &self.config, signal) {
                    Some(location) => Resolution::Deflect(location),
                    None => Resolution::Invoke { route, bindings },
                }
            }
            MatchResult::NoMatch => match self.config.not_found {
                NotFoundPolicy::Redirect => Resolution::Fallback(resolve_location(
                    request.base_path(),
                    &self.config.default_location,
                )),
                NotFoundPolicy::Error => Resolution::NotFound(RouteNotFound {
                    method: request.method().to_string(),
                    path: request.path(),
                }),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::DevicePolicy;
    use serde_json::json;

    fn router(routes: &[(&str, &str, &str, DevicePolicy)], config: RoutingConfig) -> Router {
        let mut table = RouteTable::new();
        for (method, path, handler, device) in routes {
            table
                .register(method, path, handler, json!({}), Vec::new(), *device)
                .unwrap();
        }
        Router::new(table, config)
    }

    #[test]
    fn test_invoke() {
        let router = router(&[("GET", "/user/{id}", "User:show", DevicePolicy::Auto)], RoutingConfig::default());
        let req = router.normalize("GET", "/user/42", "");
        match router.resolve(&req, &false) {
            Resolution::Invoke { route, bindings } => {
                assert_eq!(route.handler().to_string(), "User:show");
                assert_eq!(bindings.get("id"), Some("42"));
            }
            other => panic!("unexpected resolution: {:?}", other),
        }
    }

    #[test]
    fn test_fallback_uses_base_path() {
        let config = RoutingConfig {
            mount_path: "/app/index.php".into(),
            default_location: "/home".into(),
            ..RoutingConfig::default()
        };
        let router = router(&[], config);
        let req = router.normalize("GET", "/app/nowhere", "");
        match router.resolve(&req, &false) {
            Resolution::Fallback(location) => assert_eq!(location, "/app/home"),
            other => panic!("unexpected resolution: {:?}", other),
        }
    }

    #[test]
    fn test_full_url_default_location() {
        let config = RoutingConfig {
            mount_path: "/app".into(),
            default_location: "https://example.com/".into(),
            ..RoutingConfig::default()
        };
        let router = router(&[], config);
        let req = router.normalize("GET", "/app/x", "");
        assert!(matches!(
            router.resolve(&req, &false),
            Resolution::Fallback(ref l) if l == "https://example.com/"
        ));
    }

    #[test]
    fn test_not_found_policy() {
        let config = RoutingConfig {
            not_found: NotFoundPolicy::Error,
            ..RoutingConfig::default()
        };
        let router = router(&[("GET", "/a/b", "A", DevicePolicy::Web)], config);
        let req = router.normalize("get", "/a/b/c", "");
        match router.resolve(&req, &false) {
            Resolution::NotFound(err) => {
                assert_eq!(err.status(), 404);
                assert_eq!(err.method, "GET");
                assert_eq!(err.path, "/a/b/c");
            }
            other => panic!("unexpected resolution: {:?}", other),
        }
    }

    #[test]
    fn test_deflect_mobile_route() {
        let router = router(&[("GET", "/shop/{item}", "Shop:show", DevicePolicy::Mobile)], RoutingConfig::default());
        let req = router.normalize("GET", "/shop/lamp", "");
        let resolution = router.resolve(&req, &false);
        assert_eq!(resolution.label(), "deflected");
        assert!(matches!(resolution, Resolution::Deflect(ref l) if l == "/m/shop/lamp"));
    }
}
