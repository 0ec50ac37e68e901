//! Request middleware.
//!
//! Cross-cutting layers wrapped around the whole application: panic
//! recovery, security headers and request tracing.

pub mod recover;
pub mod security_headers;
pub mod trace;

pub use recover::RecoverPanic;
pub use security_headers::security_headers;
pub use trace::Trace;
