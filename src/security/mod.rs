//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → body limit (tower-http, configured in http::server)
//!     → rate_limit.rs (per-IP budget, POST /register only)
//!     → handler
//! Outgoing response:
//!     → headers.rs (hardening headers)
//! ```
//!
//! # Design Decisions
//! - Fail closed: over-limit requests never reach the registrar
//! - No trust in client input: the rate-limit key is the peer address

pub mod headers;
pub mod rate_limit;

pub use headers::with_security_headers;
pub use rate_limit::{rate_limit_middleware, RateLimiter};
