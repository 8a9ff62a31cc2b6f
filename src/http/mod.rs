//! HTTP front controller.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request ID assigned, propagated to the response)
//!     → front controller: method, URI, headers, body
//!     → Dispatcher (on the blocking pool)
//!     → response, 302 redirect, 404 or 500
//! ```

pub mod request;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
