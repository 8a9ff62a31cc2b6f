//! Shared utilities for integration tests.

use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use axum::response::IntoResponse;
use clean_dispatch::config::{DispatcherConfig, RouteConfig, RoutingConfig};
use clean_dispatch::handlers::{ActionCall, ConstructCall, DependencyRegistry, HandlerRegistry};
use clean_dispatch::lifecycle::build_dispatcher;
use clean_dispatch::routing::VariableBindings;
use clean_dispatch::Dispatcher;

/// One observed handler invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub handler: String,
    pub bindings: VariableBindings,
    pub body: Vec<u8>,
    pub dependencies: Vec<String>,
}

/// Collects invocations from every handler it registers.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    calls: Arc<Mutex<Vec<Call>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Register `target:action` as a recording action handler.
    pub fn action(&self, registry: &mut HandlerRegistry, target: &str, action: &str) {
        let calls = self.calls.clone();
        let name = format!("{}:{}", target, action);
        registry.action(target, action, move |call: ActionCall<'_>| {
            calls.lock().unwrap().push(Call {
                handler: name.clone(),
                bindings: call.bindings,
                body: call.body.to_vec(),
                dependencies: call.dependencies.names().map(String::from).collect(),
            });
            Ok(StatusCode::OK.into_response())
        });
    }

    /// Register `name` as a recording construct handler.
    pub fn construct(&self, registry: &mut HandlerRegistry, name: &str) {
        let calls = self.calls.clone();
        let handler = name.to_string();
        registry.construct(name, move |call: ConstructCall<'_>| {
            calls.lock().unwrap().push(Call {
                handler: handler.clone(),
                bindings: call.bindings,
                body: call.body.to_vec(),
                dependencies: Vec::new(),
            });
            Ok(StatusCode::OK.into_response())
        });
    }
}

/// Build a dispatcher where every route's handler is a recording one.
pub fn recording_dispatcher(
    routing: RoutingConfig,
    routes: Vec<RouteConfig>,
    dependencies: DependencyRegistry,
) -> (Dispatcher, Recorder) {
    let recorder = Recorder::new();
    let mut handlers = HandlerRegistry::new();
    for route in &routes {
        match route.handler.split_once(':') {
            Some((target, action)) => recorder.action(&mut handlers, target, action),
            None => recorder.construct(&mut handlers, &route.handler),
        }
    }

    let config = DispatcherConfig {
        routing,
        routes,
        ..DispatcherConfig::default()
    };
    let dispatcher = build_dispatcher(&config, Arc::new(handlers), Arc::new(dependencies)).unwrap();
    (dispatcher, recorder)
}

/// Shorthand for a route with default args and device policy.
pub fn route(method: &str, path: &str, handler: &str) -> RouteConfig {
    RouteConfig::new(method, path, handler)
}
