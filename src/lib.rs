//! Request-handling front layer for axum services.
//!
//! Every request gets a sequence number, a robot classification and an
//! access log record, passes through a panic barrier, and is routed by exact
//! path or, failing that, by an ordered list of URI patterns.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod security;
pub mod status;

pub use config::ServerConfig;
pub use http::{RequestContext, ServerError, UserAgent, WebServer};
pub use lifecycle::{ServerHandle, Shutdown};
pub use routing::{Middleware, WebRoute, WebService};
pub use status::StatusService;
