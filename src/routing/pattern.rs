//! Route pattern parsing.
//!
//! # Responsibilities
//! - Split a raw pattern into the method segment plus path segments
//! - Classify each path segment as a literal or a `{name}` variable
//! - Derive the structural shape used for duplicate detection
//!
//! # Design Decisions
//! - The method is uppercased and stored as segment 0
//! - Trailing `/` is ignored, so `/blog/` and `/blog` are the same pattern
//! - Literals keep their original text for display and a folded copy for
//!   case-insensitive comparison
//! - Variable names do not take part in structural equality

use std::collections::HashSet;
use std::fmt;

use crate::routing::error::{RouteError, RouteResult};

/// One `/`-delimited token of a route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Must equal the request segment, ignoring case.
    Literal { text: String, folded: String },
    /// Captures the request segment under `name`.
    Variable { name: String },
}

impl Segment {
    /// Classify a raw pattern token.
    ///
    /// A token is a variable only when it is exactly `{` + name + `}` with a
    /// non-empty name; anything else, `{}` included, is a literal.
    pub fn parse(raw: &str) -> Self {
        match raw.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            Some(name) if !name.is_empty() => Segment::Variable {
                name: name.to_string(),
            },
            _ => Segment::literal(raw),
        }
    }

    pub fn literal(text: &str) -> Self {
        Segment::Literal {
            text: text.to_string(),
            folded: text.to_lowercase(),
        }
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Segment::Variable { .. })
    }

    fn shape(&self) -> ShapeSegment {
        match self {
            Segment::Literal { folded, .. } => ShapeSegment::Literal(folded.clone()),
            Segment::Variable { .. } => ShapeSegment::Variable,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Literal { text, .. } => f.write_str(text),
            Segment::Variable { name } => write!(f, "{{{}}}", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ShapeSegment {
    Literal(String),
    Variable,
}

/// Structural key of a pattern: segment count, segment kinds and folded
/// literal text. Two patterns with equal shapes can never be told apart by
/// the matcher, so only the first one is kept.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PatternShape(Vec<ShapeSegment>);

/// A parsed route pattern. Segment 0 is the uppercased method.
#[derive(Debug, Clone)]
pub struct RoutePattern {
    segments: Vec<Segment>,
    shape: PatternShape,
}

impl RoutePattern {
    /// Parse `pattern` for `method`.
    ///
    /// ```
    /// use clean_dispatch::routing::RoutePattern;
    ///
    /// let pattern = RoutePattern::parse("get", "/user/{id}/").unwrap();
    /// assert_eq!(pattern.to_string(), "GET /user/{id}");
    /// assert_eq!(pattern.len(), 3);
    /// ```
    pub fn parse(method: &str, pattern: &str) -> RouteResult<Self> {
        if !is_method_token(method) {
            return Err(RouteError::InvalidMethod(method.to_string()));
        }

        let trimmed = pattern.trim_end_matches('/');
        let path = trimmed.strip_prefix('/').unwrap_or(trimmed);

        let mut segments = vec![Segment::literal(&method.to_uppercase())];
        if !path.is_empty() {
            segments.extend(path.split('/').map(Segment::parse));
        }

        let mut seen = HashSet::new();
        for segment in &segments {
            if let Segment::Variable { name } = segment {
                if !seen.insert(name.as_str()) {
                    return Err(RouteError::DuplicateVariable {
                        pattern: render(&segments),
                        name: name.clone(),
                    });
                }
            }
        }

        let shape = PatternShape(segments.iter().map(Segment::shape).collect());
        Ok(Self { segments, shape })
    }

    /// The uppercased method.
    pub fn method(&self) -> &str {
        match &self.segments[0] {
            Segment::Literal { text, .. } => text,
            Segment::Variable { name } => name,
        }
    }

    /// All segments, method first.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Segment count including the method segment.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false: the method segment is always present.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn shape(&self) -> &PatternShape {
        &self.shape
    }

    /// Names of the variables in declaration order.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Variable { name } => Some(name.as_str()),
            Segment::Literal { .. } => None,
        })
    }
}

impl PartialEq for RoutePattern {
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape
    }
}

impl Eq for RoutePattern {}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(&self.segments))
    }
}

fn render(segments: &[Segment]) -> String {
    let mut out = String::new();
    if let Some((method, rest)) = segments.split_first() {
        out.push_str(&method.to_string());
        out.push(' ');
        if rest.is_empty() {
            out.push('/');
        }
        for segment in rest {
            out.push('/');
            out.push_str(&segment.to_string());
        }
    }
    out
}

// RFC 9110 token characters.
fn is_method_token(method: &str) -> bool {
    !method.is_empty()
        && method
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c))
}
