//! Edge request dispatcher.
//!
//! Stateless per-call handling: each inbound request is validated, rate
//! checked, resolved against the endpoint registry, and forwarded through the
//! upstream gateway. The only cross-request mutable state is the advisory
//! rate limiter.

pub mod handler;
pub mod rate_limiter;
pub mod server;

pub use handler::{dispatch, AppState, MAX_INPUT_CHARS};
pub use rate_limiter::RateLimiter;
pub use server::{build_app, DispatchServer};
