//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Service registration (at startup):
//!     WebService::routes()      → primary axum Router (exact paths)
//!     WebService::alt_routes()  → router.rs (compiled regex, ordered)
//!     WebService::middlewares() → wrapped around both
//!
//! Incoming Request:
//!     → primary router lookup
//!     → on miss: router.rs linear scan (matcher.rs per route)
//!     → Return: handler response or explicit no-match (404)
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - A malformed pattern is a startup failure, never a request failure
//! - Deterministic: same input always matches same route
//! - First match wins (ordered by registration)

pub mod matcher;
pub mod router;
pub mod service;

pub use router::AltRouter;
pub use service::{BoxedHandler, InitError, Middleware, WebRoute, WebService};

/// Route registration failure.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("invalid route pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid route path {path:?}: {reason}")]
    InvalidPath { path: String, reason: &'static str },

    #[error("route {method} {path:?} is already registered")]
    Duplicate { method: String, path: String },

    #[error("route {path:?} overlaps {existing:?}; captures at the same position must share a name")]
    Conflict { path: String, existing: String },

    #[error("method {method} cannot be routed for {path:?}")]
    UnsupportedMethod { method: String, path: String },
}
