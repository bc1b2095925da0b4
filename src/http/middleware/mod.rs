//! Pipeline stages, outermost first:
//! sequence → access_log → robots → (panic barrier) → routers.

pub mod access_log;
pub mod robots;
pub mod sequence;

pub use access_log::{access_log_middleware, AccessLogSink, AccessLogState, AccessRecord, TracingSink};
pub use robots::robots_middleware;
pub use sequence::sequence_middleware;
