//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum setup, pipeline assembly)
//!     → middleware/sequence.rs (RequestContext with sequence number)
//!     → middleware/access_log.rs (times the rest, writes one record)
//!     → middleware/robots.rs (robot flag)
//!     → panic barrier (response.rs builds the 500)
//!     → primary router, else routing::AltRouter, else 404
//! ```

pub mod middleware;
pub mod request;
pub mod response;
pub mod server;
pub mod user_agent;

pub use request::{RequestContext, RequestCounter};
pub use server::{ServerError, WebServer};
pub use user_agent::{Family, UserAgent};
