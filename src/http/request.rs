//! Per-request state.
//!
//! # Responsibilities
//! - Assign each inbound request a sequence number
//! - Carry the robot flag and the access-log opt-out to handlers
//!
//! # Design Decisions
//! - Sequence numbers come from a counter owned by the server instance,
//!   never from process-global state
//! - Context is a typed struct in the request extensions, not a key/value bag
//! - The access-log opt-out is shared between the handler's copy of the
//!   context and the logger's, so a handler can flip it after extraction

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::{request::Parts, StatusCode};

/// Server-wide request counter.
///
/// `next` starts at 1 and never repeats for the life of the counter.
#[derive(Debug, Default)]
pub struct RequestCounter {
    value: AtomicU64,
}

impl RequestCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment and return the new value in one atomic step.
    pub fn next(&self) -> u64 {
        self.value.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Number of sequence numbers handed out so far.
    pub fn current(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// Typed per-request context, available to handlers as an extractor.
#[derive(Debug, Clone)]
pub struct RequestContext {
    sequence: u64,
    robot: bool,
    suppress_access_log: Arc<AtomicBool>,
}

impl RequestContext {
    pub fn new(sequence: u64) -> Self {
        Self {
            sequence,
            robot: false,
            suppress_access_log: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn is_robot(&self) -> bool {
        self.robot
    }

    pub(crate) fn set_robot(&mut self, robot: bool) {
        self.robot = robot;
    }

    /// Skip the access log record for this request.
    pub fn suppress_access_log(&self) {
        self.suppress_access_log.store(true, Ordering::Relaxed);
    }

    pub fn access_log_suppressed(&self) -> bool {
        self.suppress_access_log.load(Ordering::Relaxed)
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .ok_or((StatusCode::INTERNAL_SERVER_ERROR, "request context missing"))
    }
}
