//! Structured logging.
//!
//! # Responsibilities
//! - Initialize logging subsystem
//! - Route access records to their own sink
//! - Configure log level at runtime
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - Access records use a dedicated target so they can be filtered and
//!   formatted separately from server logs
//! - JSON format for production, pretty format for development
//! - Log level configurable via config and environment

use tracing::Metadata;
use tracing_subscriber::{
    filter::filter_fn, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

use crate::config::{AccessLogConfig, LogFormat, ObservabilityConfig};

/// Target of every access log record.
pub const ACCESS_LOG_TARGET: &str = "webfront::access";

fn is_access_record(meta: &Metadata<'_>) -> bool {
    meta.target() == ACCESS_LOG_TARGET
}

/// Install the global subscriber: server logs on one layer, access records on another.
pub fn init_logging(
    observability: &ObservabilityConfig,
    access_log: &AccessLogConfig,
) -> Result<(), tracing_subscriber::util::TryInitError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},tower_http=warn", observability.log_level)));

    let server_layer = fmt::layer()
        .with_target(true)
        .with_filter(filter_fn(|meta| !is_access_record(meta)));

    let access_layer = match access_log.format {
        LogFormat::Json => fmt::layer()
            .json()
            .flatten_event(true)
            .with_target(false)
            .with_filter(filter_fn(is_access_record))
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .with_target(false)
            .with_filter(filter_fn(is_access_record))
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(server_layer)
        .with(access_layer)
        .try_init()
}
