//! Clean-URL dispatcher.
//!
//! Maps `METHOD /clean/{url}` patterns to named handlers, captures path
//! variables, deflects mobile clients to a separate application and falls
//! back to a redirect or a 404 when nothing matches.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ───────────────▶ http::server ──▶ dispatch::request ──▶ dispatch::router
//!                      (front ctrl)     (normalize)            │  routing::matcher
//!                                                              │  dispatch::device
//!                                                              ▼
//!     Client Response                                   dispatch::dispatcher
//!     ◀────────────── 200 / 302 / 404 / 500 ◀────────── handlers::registry
//!
//!     Cross-cutting: config (TOML + watch), lifecycle, observability
//! ```

pub mod config;
pub mod dispatch;
pub mod handlers;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::schema::DispatcherConfig;
pub use dispatch::{DispatchOutcome, Dispatcher, NormalizedRequest, Router};
pub use handlers::{DependencyRegistry, HandlerRegistry};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{RouteTable, VariableBindings};
