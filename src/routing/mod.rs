//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Registration (at startup):
//!     RouteConfig[] / register() calls
//!     → pattern.rs (parse method + segments, compute shape)
//!     → table.rs (reject structural duplicates, keep order)
//!     → Freeze as immutable RouteTable
//!
//! Incoming Request (method + path segments)
//!     → matcher.rs (segment-wise comparison, variable capture)
//!     → Return: MatchResult::Matched or MatchResult::NoMatch
//! ```
//!
//! # Design Decisions
//! - Routes registered at startup, immutable at runtime
//! - Deterministic: same input always matches same route
//! - First match wins (registration order)

pub mod error;
pub mod matcher;
pub mod pattern;
pub mod table;

pub use error::{RouteError, RouteNotFound, RouteResult};
pub use matcher::{decode_variable, find, match_route, MatchResult, VariableBindings};
pub use pattern::{RoutePattern, Segment};
pub use table::{DevicePolicy, HandlerArgs, HandlerRef, RouteDefinition, RouteTable};
