//! Handler registry.
//!
//! # Responsibilities
//! - Map handler references from the route table to callable handlers
//! - Support both handler forms:
//!   - `Name:action`: built from the route args, then the named action is
//!     called with (dependencies, bindings, body)
//!   - `Name`: receives (args, bindings, body) directly
//!
//! # Design Decisions
//! - Populated at startup, read-only while serving
//! - Handlers are trait objects; plain closures implement the traits
//! - Handler failures are returned untouched to the caller

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use axum::body::Bytes;
use axum::response::Response;

use crate::handlers::dependency::Dependencies;
use crate::routing::{HandlerArgs, HandlerRef, VariableBindings};

/// Error type handlers may fail with.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Result of invoking a handler.
pub type HandlerResult = Result<Response, HandlerError>;

/// Arguments for an action-form handler.
#[derive(Debug)]
pub struct ActionCall<'a> {
    /// Static args the handler is built with.
    pub args: &'a HandlerArgs,
    pub dependencies: Dependencies,
    pub bindings: VariableBindings,
    pub body: Bytes,
}

/// Arguments for a construct-form handler.
#[derive(Debug)]
pub struct ConstructCall<'a> {
    pub args: &'a HandlerArgs,
    pub bindings: VariableBindings,
    pub body: Bytes,
}

/// One action of a named handler (`Name:action`).
pub trait Action: Send + Sync {
    fn call(&self, call: ActionCall<'_>) -> HandlerResult;
}

impl<F> Action for F
where
    F: Fn(ActionCall<'_>) -> HandlerResult + Send + Sync,
{
    fn call(&self, call: ActionCall<'_>) -> HandlerResult {
        (self)(call)
    }
}

/// A handler invoked with the full context at construction (`Name`).
pub trait Construct: Send + Sync {
    fn call(&self, call: ConstructCall<'_>) -> HandlerResult;
}

impl<F> Construct for F
where
    F: Fn(ConstructCall<'_>) -> HandlerResult + Send + Sync,
{
    fn call(&self, call: ConstructCall<'_>) -> HandlerResult {
        (self)(call)
    }
}

/// A handler looked up from a `HandlerRef`.
pub enum Handler<'a> {
    Action(&'a dyn Action),
    Construct(&'a dyn Construct),
}

/// Named handlers available to the route table.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    actions: HashMap<(String, String), Arc<dyn Action>>,
    constructors: HashMap<String, Arc<dyn Construct>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `target:action`.
    pub fn action<F>(&mut self, target: &str, action: &str, handler: F) -> &mut Self
    where
        F: Fn(ActionCall<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        self.insert_action(target, action, Arc::new(handler))
    }

    /// Register `target:action` backed by a handler object.
    pub fn insert_action(&mut self, target: &str, action: &str, handler: Arc<dyn Action>) -> &mut Self {
        self.actions
            .insert((target.to_string(), action.to_string()), handler);
        self
    }

    /// Register a construct-form handler under `name`.
    pub fn construct<F>(&mut self, name: &str, handler: F) -> &mut Self
    where
        F: Fn(ConstructCall<'_>) -> HandlerResult + Send + Sync + 'static,
    {
        self.insert_construct(name, Arc::new(handler))
    }

    pub fn insert_construct(&mut self, name: &str, handler: Arc<dyn Construct>) -> &mut Self {
        self.constructors.insert(name.to_string(), handler);
        self
    }

    pub fn get(&self, reference: &HandlerRef) -> Option<Handler<'_>> {
        match reference {
            HandlerRef::Action { target, action } => self
                .actions
                .get(&(target.clone(), action.clone()))
                .map(|h| Handler::Action(h.as_ref())),
            HandlerRef::Construct { name } => self
                .constructors
                .get(name)
                .map(|h| Handler::Construct(h.as_ref())),
        }
    }

    pub fn contains(&self, reference: &HandlerRef) -> bool {
        self.get(reference).is_some()
    }

    pub fn len(&self) -> usize {
        self.actions.len() + self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<String> = self
            .actions
            .keys()
            .map(|(t, a)| format!("{}:{}", t, a))
            .chain(self.constructors.keys().cloned())
            .collect();
        names.sort();
        f.debug_struct("HandlerRegistry").field("handlers", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    #[test]
    fn test_lookup_by_reference() {
        let mut registry = HandlerRegistry::new();
        registry
            .action("User", "show", |_call: ActionCall<'_>| Ok(StatusCode::OK.into_response()))
            .construct("Home", |_call: ConstructCall<'_>| Ok(StatusCode::ACCEPTED.into_response()));

        assert_eq!(registry.len(), 2);
        assert!(matches!(
            registry.get(&"User:show".parse().unwrap()),
            Some(Handler::Action(_))
        ));
        assert!(matches!(
            registry.get(&"Home".parse().unwrap()),
            Some(Handler::Construct(_))
        ));
        assert!(!registry.contains(&"User:edit".parse().unwrap()));
        assert!(!registry.contains(&"User".parse().unwrap()));
    }

    #[test]
    fn test_handler_objects() {
        struct Fixed(StatusCode);

        impl Construct for Fixed {
            fn call(&self, _call: ConstructCall<'_>) -> HandlerResult {
                Ok(self.0.into_response())
            }
        }

        let mut registry = HandlerRegistry::new();
        registry.insert_construct("Teapot", Arc::new(Fixed(StatusCode::IM_A_TEAPOT)));

        let args = HandlerArgs::Null;
        let response = match registry.get(&"Teapot".parse().unwrap()) {
            Some(Handler::Construct(handler)) => handler
                .call(ConstructCall {
                    args: &args,
                    bindings: VariableBindings::new(),
                    body: Bytes::new(),
                })
                .unwrap(),
            _ => panic!("expected construct handler"),
        };
        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    }
}
