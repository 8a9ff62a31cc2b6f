//! Request normalization.
//!
//! # Responsibilities
//! - Strip the query string and percent-decode the path
//! - Remove the prefix shared with the mount (script) path
//! - Prepend the uppercased method as segment 0
//!
//! # Design Decisions
//! - Derived once per request, discarded after dispatch
//! - The stripped prefix is kept as `base_path` so relative redirect
//!   locations resolve under any deployment sub-path
//! - Decoding happens before splitting: an encoded `%2F` becomes a
//!   separator, which is why captured values use the `__` convention

use axum::body::Bytes;
use percent_encoding::percent_decode_str;

/// A request reduced to what the matcher needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRequest {
    method: String,
    segments: Vec<String>,
    body: Bytes,
    base_path: String,
}

impl NormalizedRequest {
    /// Normalize a raw request.
    ///
    /// `target` is the request URI as sent (path plus optional query);
    /// `script_path` is where the dispatcher is mounted.
    ///
    /// ```
    /// use clean_dispatch::dispatch::NormalizedRequest;
    ///
    /// let req = NormalizedRequest::new("get", "/app/index.php/user/42?x=1", "/app/index.php", "");
    /// assert_eq!(req.segments(), ["GET", "user", "42"]);
    /// assert_eq!(req.base_path(), "/app/index.php");
    /// ```
    pub fn new(method: &str, target: &str, script_path: &str, body: impl Into<Bytes>) -> Self {
        let method = method.to_uppercase();
        let raw_path = target.split_once('?').map_or(target, |(path, _)| path);
        let decoded = percent_decode_str(raw_path).decode_utf8_lossy();
        let parts: Vec<&str> = decoded.trim_end_matches('/').split('/').collect();
        let script: Vec<&str> = script_path.split('/').collect();

        // parts[0] is whatever precedes the first '/', normally empty.
        // Empty segments never extend the prefix.
        let mut base_path = String::new();
        let mut start = 1;
        while start < parts.len()
            && start < script.len()
            && !parts[start].is_empty()
            && parts[start].to_lowercase() == script[start].to_lowercase()
        {
            base_path.push('/');
            base_path.push_str(parts[start]);
            start += 1;
        }

        let mut segments = Vec::with_capacity(parts.len().saturating_sub(start) + 1);
        segments.push(method.clone());
        segments.extend(parts.iter().skip(start).map(|s| s.to_string()));

        Self {
            method,
            segments,
            body: body.into(),
            base_path,
        }
    }

    /// Build from already split path segments (method excluded).
    pub fn from_segments<I, S>(method: &str, path: I, body: impl Into<Bytes>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let method = method.to_uppercase();
        let mut segments = vec![method.clone()];
        segments.extend(path.into_iter().map(Into::into));
        Self {
            method,
            segments,
            body: body.into(),
            base_path: String::new(),
        }
    }

    /// Replace the base path used to resolve relative locations.
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into();
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// Method followed by the path segments beyond the mount prefix.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Path segments without the method.
    pub fn path_segments(&self) -> &[String] {
        &self.segments[1..]
    }

    /// The path beyond the mount prefix, rebuilt with `/`.
    pub fn path(&self) -> String {
        let mut path = String::new();
        for segment in self.path_segments() {
            path.push('/');
            path.push_str(segment);
        }
        if path.is_empty() {
            path.push('/');
        }
        path
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }
}
