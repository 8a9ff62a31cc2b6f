//! Request dispatch.
//!
//! # Responsibilities
//! - Verify at startup that every route's handler and dependencies exist
//! - Resolve each request through the `Router`
//! - Invoke the bound handler, or report the redirect / not-found outcome
//!
//! # Design Decisions
//! - No state across calls beyond the immutable router and registries
//! - Handler failures propagate unmodified; they are not outcomes
//! - Every dispatch is timed and counted by outcome

use std::sync::Arc;
use std::time::Instant;

use axum::response::Response;
use thiserror::Error;

use crate::dispatch::device::DeviceSignal;
use crate::dispatch::request::NormalizedRequest;
use crate::dispatch::router::{Resolution, Router};
use crate::handlers::{
    ActionCall, ConstructCall, DependencyRegistry, Handler, HandlerError, HandlerRegistry, HandlerResult,
};
use crate::observability::metrics;
use crate::routing::{RouteDefinition, RouteNotFound, VariableBindings};

/// Outcome label for a handler that returned an error.
const FAILED: &str = "failed";

/// Startup wiring errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("route {route} references unknown handler {handler}")]
    UnknownHandler { route: String, handler: String },

    #[error("route {route} references unknown dependency {dependency}")]
    UnknownDependency { route: String, dependency: String },
}

/// Terminal result of a dispatch.
#[derive(Debug)]
pub enum DispatchOutcome {
    /// A handler ran and produced this response.
    Invoked(Response),
    /// The client is sent elsewhere (mobile app or default location).
    Redirected(String),
    /// Nothing matched and the not-found policy is `error`.
    NotFound(RouteNotFound),
}

/// Matches requests and invokes their handlers.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    router: Router,
    handlers: Arc<HandlerRegistry>,
    dependencies: Arc<DependencyRegistry>,
}

impl Dispatcher {
    /// Wire `router` to the registries, failing on the first route whose
    /// handler or dependency is not registered.
    pub fn new(
        router: Router,
        handlers: Arc<HandlerRegistry>,
        dependencies: Arc<DependencyRegistry>,
    ) -> Result<Self, DispatchError> {
        for route in router.table() {
            if !handlers.contains(route.handler()) {
                return Err(DispatchError::UnknownHandler {
                    route: route.pattern().to_string(),
                    handler: route.handler().to_string(),
                });
            }
            if let Some(missing) = route.dependencies().iter().find(|d| !dependencies.contains(d)) {
                return Err(DispatchError::UnknownDependency {
                    route: route.pattern().to_string(),
                    dependency: missing.clone(),
                });
            }
        }

        metrics::record_route_count(router.table().len());
        Ok(Self {
            router,
            handlers,
            dependencies,
        })
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Dispatch one request.
    ///
    /// `Err` carries a handler's own failure, unmodified.
    pub fn dispatch(
        &self,
        request: &NormalizedRequest,
        signal: &dyn DeviceSignal,
    ) -> Result<DispatchOutcome, HandlerError> {
        let start = Instant::now();
        let resolution = self.router.resolve(request, signal);
        let label = resolution.label();

        let result = match resolution {
            Resolution::Invoke { route, bindings } => {
                self.invoke(route, bindings, request).map(DispatchOutcome::Invoked)
            }
            Resolution::Deflect(location) | Resolution::Fallback(location) => {
                Ok(DispatchOutcome::Redirected(location))
            }
            Resolution::NotFound(err) => Ok(DispatchOutcome::NotFound(err)),
        };

        let outcome = outcome_label(label, &result);
        tracing::debug!(
            method = %request.method(),
            path = %request.path(),
            outcome,
            "Dispatched request"
        );
        metrics::record_dispatch(outcome, start);
        result
    }

    fn invoke(
        &self,
        route: &RouteDefinition,
        bindings: VariableBindings,
        request: &NormalizedRequest,
    ) -> HandlerResult {
        let handler = self.handlers.get(route.handler()).ok_or_else(|| {
            HandlerError::from(DispatchError::UnknownHandler {
                route: route.pattern().to_string(),
                handler: route.handler().to_string(),
            })
        })?;
        let body = request.body().clone();

        match handler {
            Handler::Action(action) => {
                let dependencies = self.dependencies.resolve(route.dependencies()).map_err(|dependency| {
                    HandlerError::from(DispatchError::UnknownDependency {
                        route: route.pattern().to_string(),
                        dependency,
                    })
                })?;
                action.call(ActionCall {
                    args: route.args(),
                    dependencies,
                    bindings,
                    body,
                })
            }
            Handler::Construct(construct) => construct.call(ConstructCall {
                args: route.args(),
                bindings,
                body,
            }),
        }
    }
}

/// The label a finished dispatch is logged and counted under.
fn outcome_label(resolved: &'static str, result: &Result<DispatchOutcome, HandlerError>) -> &'static str {
    match result {
        Ok(_) => resolved,
        Err(_) => FAILED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RoutingConfig;
    use crate::routing::{DevicePolicy, RouteTable};
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use serde_json::json;

    fn table(handler: &str, dependencies: Vec<String>) -> RouteTable {
        let mut table = RouteTable::new();
        table
            .register("GET", "/x/{id}", handler, json!({}), dependencies, DevicePolicy::Web)
            .unwrap();
        table
    }

    fn ok_registry() -> HandlerRegistry {
        let mut registry = HandlerRegistry::new();
        registry.action("X", "show", |_call: ActionCall<'_>| Ok(StatusCode::OK.into_response()));
        registry
    }

    #[test]
    fn test_unknown_handler_rejected_at_startup() {
        let router = Router::new(table("X:missing", vec![]), RoutingConfig::default());
        let err = Dispatcher::new(router, Arc::new(ok_registry()), Arc::default()).unwrap_err();
        assert_eq!(
            err,
            DispatchError::UnknownHandler {
                route: "GET /x/{id}".into(),
                handler: "X:missing".into(),
            }
        );
    }

    #[test]
    fn test_unknown_dependency_rejected_at_startup() {
        let router = Router::new(table("X:show", vec!["Repo".into()]), RoutingConfig::default());
        let err = Dispatcher::new(router, Arc::new(ok_registry()), Arc::default()).unwrap_err();
        assert!(matches!(err, DispatchError::UnknownDependency { ref dependency, .. } if dependency == "Repo"));
    }

    #[test]
    fn test_handler_error_propagates_unmodified() {
        #[derive(Debug, Error)]
        #[error("database unavailable")]
        struct DatabaseDown;

        let mut registry = HandlerRegistry::new();
        registry.action("X", "show", |_call: ActionCall<'_>| Err(DatabaseDown.into()));

        let router = Router::new(table("X:show", vec![]), RoutingConfig::default());
        let dispatcher = Dispatcher::new(router, Arc::new(registry), Arc::default()).unwrap();
        let req = dispatcher.router().normalize("GET", "/x/1", "");

        let err = dispatcher.dispatch(&req, &false).unwrap_err();
        assert!(err.downcast_ref::<DatabaseDown>().is_some());
    }

    #[test]
    fn test_failed_handler_labelled_failed() {
        let failed: Result<DispatchOutcome, HandlerError> = Err("boom".into());
        assert_eq!(outcome_label("invoked", &failed), "failed");

        let invoked = Ok(DispatchOutcome::Invoked(StatusCode::OK.into_response()));
        assert_eq!(outcome_label("invoked", &invoked), "invoked");

        let redirected = Ok(DispatchOutcome::Redirected("/".into()));
        assert_eq!(outcome_label("fallback", &redirected), "fallback");
    }
}
