//! Mobile client detection.
//!
//! # Responsibilities
//! - Classify a client as mobile from its request headers
//! - Adapt a detector plus headers into a lazy `DeviceSignal`
//!
//! # Design Decisions
//! - Detection is a black box behind `MobileDetector`; the bundled
//!   implementation is a keyword scan of `User-Agent`
//! - WAP profile headers are treated as a mobile indication
//! - No regex to guarantee O(n) matching

use axum::http::{header, HeaderMap};

use crate::dispatch::device::DeviceSignal;

/// Decides whether the client sending `headers` is a mobile device.
pub trait MobileDetector: Send + Sync {
    fn is_mobile(&self, headers: &HeaderMap) -> bool;
}

const DEFAULT_KEYWORDS: &[&str] = &[
    "mobi",
    "android",
    "iphone",
    "ipod",
    "ipad",
    "blackberry",
    "bb10",
    "windows phone",
    "iemobile",
    "opera mini",
    "kindle",
    "silk/",
    "webos",
    "symbian",
    "nokia",
    "tablet",
];

const PROFILE_HEADERS: &[&str] = &["x-wap-profile", "profile"];

/// Keyword-based `User-Agent` detector.
#[derive(Debug, Clone)]
pub struct UserAgentDetector {
    keywords: Vec<String>,
}

impl UserAgentDetector {
    pub fn new() -> Self {
        Self::with_keywords(DEFAULT_KEYWORDS.iter().copied())
    }

    /// Build a detector matching the given (case-insensitive) keywords.
    pub fn with_keywords<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().to_lowercase())
                .collect(),
        }
    }
}

impl Default for UserAgentDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl MobileDetector for UserAgentDetector {
    fn is_mobile(&self, headers: &HeaderMap) -> bool {
        if PROFILE_HEADERS.iter().any(|h| headers.contains_key(*h)) {
            return true;
        }
        headers
            .get(header::USER_AGENT)
            .and_then(|ua| ua.to_str().ok())
            .map(|ua| {
                let ua = ua.to_lowercase();
                self.keywords.iter().any(|k| ua.contains(k.as_str()))
            })
            .unwrap_or(false)
    }
}

/// A detector bound to one request's headers.
pub struct HeaderSignal<'a> {
    detector: &'a dyn MobileDetector,
    headers: &'a HeaderMap,
}

impl<'a> HeaderSignal<'a> {
    pub fn new(detector: &'a dyn MobileDetector, headers: &'a HeaderMap) -> Self {
        Self { detector, headers }
    }
}

impl DeviceSignal for HeaderSignal<'_> {
    fn is_mobile(&self) -> bool {
        self.detector.is_mobile(self.headers)
    }
}
