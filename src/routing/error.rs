//! Routing error definitions.

use thiserror::Error;

/// Errors raised while building a route definition.
///
/// A structural duplicate is not an error: registration reports it as
/// `Ok(false)` and leaves the table untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The method is empty or contains characters outside the HTTP token set.
    #[error("invalid HTTP method: {0:?}")]
    InvalidMethod(String),

    /// The handler reference is neither `Name` nor `Name:action`.
    #[error("invalid handler reference: {0:?}")]
    InvalidHandler(String),

    /// A pattern declares the same `{name}` twice.
    #[error("variable `{name}` appears more than once in {pattern}")]
    DuplicateVariable { pattern: String, name: String },
}

/// No registered route matched the request.
///
/// Surfaced to the front controller when the not-found policy is `error`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no route matches {method} {path}")]
pub struct RouteNotFound {
    pub method: String,
    pub path: String,
}

impl RouteNotFound {
    /// HTTP status carried by the condition.
    pub const STATUS: u16 = 404;

    pub fn status(&self) -> u16 {
        Self::STATUS
    }
}

/// Result type for route registration.
pub type RouteResult<T> = Result<T, RouteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RouteError::InvalidHandler("a:b:c".into());
        assert_eq!(err.to_string(), "invalid handler reference: \"a:b:c\"");

        let err = RouteError::DuplicateVariable {
            pattern: "GET /a/{id}/{id}".into(),
            name: "id".into(),
        };
        assert!(err.to_string().contains("`id`"));
    }

    #[test]
    fn test_not_found_status() {
        let err = RouteNotFound {
            method: "GET".into(),
            path: "/missing".into(),
        };
        assert_eq!(err.status(), 404);
        assert_eq!(err.to_string(), "no route matches GET /missing");
    }
}
