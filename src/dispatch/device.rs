//! Device-redirect policy.
//!
//! Decides whether a matched request is deflected to the mobile
//! application instead of reaching its handler.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

use crate::config::RoutingConfig;
use crate::dispatch::request::NormalizedRequest;
use crate::routing::DevicePolicy;

// Characters that cannot appear raw inside one path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// The "is this client a mobile device?" predicate.
///
/// Evaluated lazily: only `auto` routes with detection enabled ask.
pub trait DeviceSignal {
    fn is_mobile(&self) -> bool;
}

impl DeviceSignal for bool {
    fn is_mobile(&self) -> bool {
        *self
    }
}

/// True when `location` is an absolute `http://` or `https://` URL.
pub fn is_full_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Resolve a configured location against the request's base path.
///
/// ```
/// use clean_dispatch::dispatch::device::resolve_location;
///
/// assert_eq!(resolve_location("/app", "/m"), "/app/m");
/// assert_eq!(resolve_location("/app", "https://m.example.com"), "https://m.example.com");
/// ```
pub fn resolve_location(base_path: &str, location: &str) -> String {
    if is_full_url(location) {
        location.to_string()
    } else {
        format!("{}{}", base_path, location)
    }
}

/// Where to send the client instead of invoking the handler, if anywhere.
pub fn deflection(
    policy: DevicePolicy,
    request: &NormalizedRequest,
    config: &RoutingConfig,
    signal: &dyn DeviceSignal,
) -> Option<String> {
    match policy {
        DevicePolicy::Web | DevicePolicy::Api => None,
        DevicePolicy::Mobile => {
            let mut location = resolve_location(request.base_path(), &config.mobile_app);
            for segment in request.path_segments() {
                location.push('/');
                location.extend(utf8_percent_encode(segment, PATH_SEGMENT));
            }
            Some(location)
        }
        DevicePolicy::Auto => {
            if config.mobile_detection && signal.is_mobile() {
                Some(resolve_location(request.base_path(), &config.mobile_app))
            } else {
                None
            }
        }
    }
}
