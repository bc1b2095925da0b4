//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → robots.rs (trust header, then crawler user-agent patterns)
//!     → robot flag on the RequestContext
//! ```
//!
//! # Design Decisions
//! - Patterns compiled once at construction
//! - Classification only; nothing is rejected here

pub mod robots;

pub use robots::{RobotDetector, RobotPatternError};
