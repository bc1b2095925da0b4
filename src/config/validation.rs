//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses and timing values
//! - Check crawler patterns compile before the server is built
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use axum::http::HeaderName;

use crate::config::schema::ServerConfig;
use crate::security::robots::compile_crawler_pattern;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = config.listener.bind_address.parse::<SocketAddr>() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("{:?} is not a socket address: {}", config.listener.bind_address, e),
        ));
    }

    if config.robots.trust_header.is_empty() {
        errors.push(ValidationError::new("robots.trust_header", "must not be empty"));
    } else if HeaderName::from_bytes(config.robots.trust_header.as_bytes()).is_err() {
        errors.push(ValidationError::new(
            "robots.trust_header",
            format!("{:?} is not a valid header name", config.robots.trust_header),
        ));
    }

    for name in &config.robots.user_agents {
        if let Err(e) = compile_crawler_pattern(name) {
            errors.push(ValidationError::new("robots.user_agents", e.to_string()));
        }
    }

    if config.lifecycle.init_timeout_ms == 0 {
        errors.push(ValidationError::new("lifecycle.init_timeout_ms", "must be greater than 0"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("{:?} is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
