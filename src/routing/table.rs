//! Ordered route registry.
//!
//! # Responsibilities
//! - Hold route definitions in registration order
//! - Reject structural duplicates at registration
//! - Expose definitions for the matcher, first registered first
//!
//! # Design Decisions
//! - Built once at startup, read-only afterwards (no locks)
//! - Duplicate detection is a hash lookup on the pattern shape
//! - A duplicate is a soft failure: `Ok(false)`, table unchanged

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::routing::error::{RouteError, RouteResult};
use crate::routing::pattern::{PatternShape, RoutePattern};

/// Static handler configuration attached to a route.
pub type HandlerArgs = serde_json::Value;

/// Per-route rule for deflecting clients to the mobile application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DevicePolicy {
    /// Deflect only when the client is detected as a mobile device.
    #[default]
    Auto,
    /// Always deflect, forwarding the request path.
    Mobile,
    /// Never deflect.
    Web,
    /// Never deflect.
    Api,
}

impl DevicePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DevicePolicy::Auto => "auto",
            DevicePolicy::Mobile => "mobile",
            DevicePolicy::Web => "web",
            DevicePolicy::Api => "api",
        }
    }
}

impl FromStr for DevicePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(DevicePolicy::Auto),
            "mobile" => Ok(DevicePolicy::Mobile),
            "web" => Ok(DevicePolicy::Web),
            "api" => Ok(DevicePolicy::Api),
            other => Err(format!("unknown device policy: {}", other)),
        }
    }
}

impl fmt::Display for DevicePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Name-based reference to the handler bound to a route.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HandlerRef {
    /// `Name`: build the handler with the route args, bindings and body.
    Construct { name: String },
    /// `Name:action`: call `action` on the handler registered as `target`.
    Action { target: String, action: String },
}

impl FromStr for HandlerRef {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let valid = |part: &str| !part.is_empty() && !part.chars().any(char::is_whitespace);
        let mut parts = s.split(':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(name), None, None) if valid(name) => Ok(HandlerRef::Construct {
                name: name.to_string(),
            }),
            (Some(target), Some(action), None) if valid(target) && valid(action) => {
                Ok(HandlerRef::Action {
                    target: target.to_string(),
                    action: action.to_string(),
                })
            }
            _ => Err(RouteError::InvalidHandler(s.to_string())),
        }
    }
}

impl fmt::Display for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerRef::Construct { name } => f.write_str(name),
            HandlerRef::Action { target, action } => write!(f, "{}:{}", target, action),
        }
    }
}

/// A registered route. Immutable once created.
#[derive(Debug, Clone)]
pub struct RouteDefinition {
    pattern: RoutePattern,
    handler: HandlerRef,
    args: HandlerArgs,
    dependencies: Vec<String>,
    device: DevicePolicy,
}

impl RouteDefinition {
    pub fn new(
        method: &str,
        pattern: &str,
        handler: &str,
        args: HandlerArgs,
        dependencies: Vec<String>,
        device: DevicePolicy,
    ) -> RouteResult<Self> {
        Ok(Self {
            pattern: RoutePattern::parse(method, pattern)?,
            handler: handler.parse()?,
            args,
            dependencies,
            device,
        })
    }

    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    pub fn handler(&self) -> &HandlerRef {
        &self.handler
    }

    pub fn args(&self) -> &HandlerArgs {
        &self.args
    }

    /// Dependency names, in the order they are handed to the handler.
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub fn device(&self) -> DevicePolicy {
        self.device
    }
}

/// Ordered collection of route definitions.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<RouteDefinition>,
    shapes: HashSet<PatternShape>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route.
    ///
    /// Returns `Ok(false)` without touching the table when a structurally
    /// identical pattern is already registered.
    ///
    /// ```
    /// use clean_dispatch::routing::{DevicePolicy, RouteTable};
    ///
    /// let mut table = RouteTable::new();
    /// let args = serde_json::json!({});
    /// assert!(table.register("GET", "/user/{id}", "User:show", args.clone(), vec![], DevicePolicy::Auto).unwrap());
    /// assert!(!table.register("get", "/USER/{key}/", "User:other", args, vec![], DevicePolicy::Web).unwrap());
    /// assert_eq!(table.len(), 1);
    /// ```
    pub fn register(
        &mut self,
        method: &str,
        pattern: &str,
        handler: &str,
        args: HandlerArgs,
        dependencies: Vec<String>,
        device: DevicePolicy,
    ) -> RouteResult<bool> {
        let definition = RouteDefinition::new(method, pattern, handler, args, dependencies, device)?;
        Ok(self.insert(definition))
    }

    /// Append an already-built definition unless its shape is taken.
    pub fn insert(&mut self, definition: RouteDefinition) -> bool {
        if !self.shapes.insert(definition.pattern.shape().clone()) {
            return false;
        }
        self.routes.push(definition);
        true
    }

    /// Definitions in registration order.
    pub fn all(&self) -> &[RouteDefinition] {
        &self.routes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RouteDefinition> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl<'a> IntoIterator for &'a RouteTable {
    type Item = &'a RouteDefinition;
    type IntoIter = std::slice::Iter<'a, RouteDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
