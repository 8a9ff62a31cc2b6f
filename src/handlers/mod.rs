//! Handler subsystem.
//!
//! Route tables refer to handlers and dependencies by name; this module
//! holds the name → implementation maps the dispatcher resolves against.

pub mod builtin;
pub mod dependency;
pub mod registry;

pub use dependency::{Dependencies, Dependency, DependencyRegistry};
pub use registry::{
    Action, ActionCall, Construct, ConstructCall, Handler, HandlerError, HandlerRegistry, HandlerResult,
};
