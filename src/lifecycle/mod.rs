//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Blocking (http::server::WebServer::run):
//!     Bind → Serve → SIGINT/SIGTERM (signals.rs) → Drain → Return
//!
//! Background (startup.rs):
//!     Bind → Spawn serve task → Wait init timeout or early failure
//!     → ServerHandle
//!
//! Shutdown (shutdown.rs):
//!     ServerHandle::shutdown → broadcast → Stop accepting → Drain
//!     → Deadline exceeded? abort task
//! ```
//!
//! # Design Decisions
//! - Bind failures are reported before anything is spawned
//! - Shutdown has a caller-supplied deadline

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::ServerHandle;
