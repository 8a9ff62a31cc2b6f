//! Dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! Raw request (method, URI, mount path, body)
//!     → request.rs (strip mount prefix, decode, segment)
//!     → router.rs (table lookup + device.rs redirect policy)
//!         - Invoke / Deflect / Fallback / NotFound
//!     → dispatcher.rs (resolve dependencies, call handler)
//!     → Return: DispatchOutcome or the handler's own error
//! ```
//!
//! # Design Decisions
//! - Stateless per call; the router and registries are shared read-only
//! - Device detection is injected (`DeviceSignal`), never global
//! - Redirects short-circuit before any handler runs

pub mod detect;
pub mod device;
pub mod dispatcher;
pub mod request;
pub mod router;

pub use detect::{HeaderSignal, MobileDetector, UserAgentDetector};
pub use device::DeviceSignal;
pub use dispatcher::{DispatchError, DispatchOutcome, Dispatcher};
pub use request::NormalizedRequest;
pub use router::{Resolution, Router};
