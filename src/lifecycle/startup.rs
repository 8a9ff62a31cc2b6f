//! Startup orchestration.
//!
//! # Responsibilities
//! - Turn route configs into a `RouteTable`, in order
//! - Wire the table to the handler and dependency registries
//!
//! # Design Decisions
//! - Fail fast: malformed routes and unknown handlers are fatal
//! - Structural duplicates are skipped with a warning, first entry wins
//! - Used for both the initial load and every hot reload

use std::sync::Arc;

use thiserror::Error;

use crate::config::{DispatcherConfig, RouteConfig, RoutingConfig};
use crate::dispatch::{DispatchError, Dispatcher, Router};
use crate::handlers::{DependencyRegistry, HandlerRegistry};
use crate::routing::{RouteError, RouteTable};

/// Error raised while building the dispatcher from configuration.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("route {index}: {source}")]
    Route { index: usize, source: RouteError },

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

/// Build a route table from config entries, in order.
pub fn route_table(routes: &[RouteConfig]) -> Result<RouteTable, StartupError> {
    let mut table = RouteTable::new();
    for (index, route) in routes.iter().enumerate() {
        let added = table
            .register(
                &route.method,
                &route.path,
                &route.handler,
                route.args.clone(),
                route.dependencies.clone(),
                route.device,
            )
            .map_err(|source| StartupError::Route { index, source })?;

        if !added {
            tracing::warn!(
                index,
                method = %route.method,
                path = %route.path,
                "Skipping route identical to an earlier one"
            );
        }
    }
    Ok(table)
}

/// Build the router (table + routing settings) without any handlers.
pub fn build_router(routes: &[RouteConfig], routing: &RoutingConfig) -> Result<Router, StartupError> {
    Ok(Router::new(route_table(routes)?, routing.clone()))
}

/// Build a dispatcher for `config`.
pub fn build_dispatcher(
    config: &DispatcherConfig,
    handlers: Arc<HandlerRegistry>,
    dependencies: Arc<DependencyRegistry>,
) -> Result<Dispatcher, StartupError> {
    let router = build_router(&config.routes, &config.routing)?;
    let dispatcher = Dispatcher::new(router, handlers, dependencies)?;

    tracing::info!(
        routes = dispatcher.router().table().len(),
        mount_path = %config.routing.mount_path,
        not_found = ?config.routing.not_found,
        "Route table built"
    );
    Ok(dispatcher)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::builtin;

    #[test]
    fn test_duplicates_skipped() {
        let routes = vec![
            RouteConfig::new("GET", "/a/{x}", "Echo"),
            RouteConfig::new("get", "/A/{y}", "Text:show"),
            RouteConfig::new("POST", "/a/{x}", "Echo"),
        ];
        let table = route_table(&routes).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.all()[0].handler().to_string(), "Echo");
    }

    #[test]
    fn test_bad_route_reports_index() {
        let routes = vec![
            RouteConfig::new("GET", "/ok", "Echo"),
            RouteConfig::new("GET", "/bad", "A:b:c"),
        ];
        let err = route_table(&routes).unwrap_err();
        assert!(matches!(err, StartupError::Route { index: 1, .. }));
    }

    #[test]
    fn test_build_dispatcher() {
        let mut handlers = HandlerRegistry::new();
        builtin::register(&mut handlers);

        let mut config = DispatcherConfig::default();
        config.routes.push(RouteConfig::new("GET", "/echo/{v}", "Echo"));
        let dispatcher = build_dispatcher(&config, Arc::new(handlers), Arc::default()).unwrap();
        assert_eq!(dispatcher.router().table().len(), 1);

        config.routes.push(RouteConfig::new("GET", "/missing", "Nope:show"));
        let err = build_dispatcher(&config, Arc::new(HandlerRegistry::new()), Arc::default()).unwrap_err();
        assert!(matches!(err, StartupError::Dispatch(DispatchError::UnknownHandler { .. })));
    }
}
