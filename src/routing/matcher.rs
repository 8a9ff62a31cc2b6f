//! Route matching logic.
//!
//! # Responsibilities
//! - Compare a request's segments against each pattern, in table order
//! - Bind `{name}` variables, decoding `__` into `/`
//! - Return the first full match or an explicit no-match
//!
//! # Design Decisions
//! - Segment count is checked before any string comparison
//! - Literals (method included) compare case-insensitively
//! - First match wins: no scoring, no backtracking
//! - No regex to guarantee O(n) matching

use std::collections::hash_map;
use std::collections::HashMap;

use serde::Serialize;

use crate::routing::pattern::Segment;
use crate::routing::table::RouteDefinition;

/// Separator smuggled inside a single path segment.
const EMBEDDED_SEPARATOR: &str = "__";

/// Variables captured by a successful match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct VariableBindings(HashMap<String, String>);

impl VariableBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Bind `name`; a later write for the same name replaces the value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, String> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> HashMap<String, String> {
        self.0
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for VariableBindings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Outcome of scanning the table.
#[derive(Debug)]
pub enum MatchResult<'r> {
    Matched {
        route: &'r RouteDefinition,
        bindings: VariableBindings,
    },
    NoMatch,
}

impl MatchResult<'_> {
    pub fn is_match(&self) -> bool {
        matches!(self, MatchResult::Matched { .. })
    }
}

/// Rewrite every `__` in a captured value to `/`.
///
/// ```
/// use clean_dispatch::routing::decode_variable;
///
/// assert_eq!(decode_variable("my__post__title"), "my/post/title");
/// assert_eq!(decode_variable("plain"), "plain");
/// ```
pub fn decode_variable(raw: &str) -> String {
    raw.replace(EMBEDDED_SEPARATOR, "/")
}

/// Find the first route in `routes` matching `segments`.
///
/// `segments` must start with the uppercased method, as produced by
/// request normalization.
pub fn find<'r>(routes: &'r [RouteDefinition], segments: &[String]) -> MatchResult<'r> {
    let folded: Vec<String> = segments.iter().map(|s| s.to_lowercase()).collect();

    for route in routes {
        if let Some(bindings) = try_route(route, segments, &folded) {
            return MatchResult::Matched { route, bindings };
        }
    }
    MatchResult::NoMatch
}

/// Test a single route. Partial bindings are dropped on the first mismatch.
pub fn match_route(route: &RouteDefinition, segments: &[String]) -> Option<VariableBindings> {
    let folded: Vec<String> = segments.iter().map(|s| s.to_lowercase()).collect();
    try_route(route, segments, &folded)
}

fn try_route(
    route: &RouteDefinition,
    segments: &[String],
    folded: &[String],
) -> Option<VariableBindings> {
    let pattern = route.pattern().segments();
    if pattern.len() != segments.len() {
        return None;
    }

    let mut bindings = VariableBindings::new();
    for ((expected, raw), lower) in pattern.iter().zip(segments).zip(folded) {
        match expected {
            Segment::Variable { name } => bindings.insert(name.as_str(), decode_variable(raw)),
            Segment::Literal { folded: literal, .. } => {
                if literal != lower {
                    return None;
                }
            }
        }
    }
    Some(bindings)
}
