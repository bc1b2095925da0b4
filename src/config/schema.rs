//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the web server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Crawler detection settings.
    pub robots: RobotConfig,

    /// Per-request access log settings.
    pub access_log: AccessLogConfig,

    /// Alternate (pattern) router behavior.
    pub alt_routes: AltRouteConfig,

    /// Startup and shutdown timing.
    pub lifecycle: LifecycleConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Crawler detection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RobotConfig {
    /// Header whose non-empty presence marks the caller as a robot.
    pub trust_header: String,

    /// Crawler names, matched case-insensitively anywhere in the User-Agent.
    pub user_agents: Vec<String>,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            trust_header: "X-Robot".to_string(),
            user_agents: [
                "facebook",
                "WhatsApp",
                "Viber",
                "TelegramBot",
                "Twitter",
                "Instagram",
                "Wget",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

/// Output format for log layers.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Access log configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AccessLogConfig {
    /// Emit one record per completed request.
    pub enabled: bool,

    /// Rendering of the access log sink.
    pub format: LogFormat,
}

impl Default for AccessLogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            format: LogFormat::Pretty,
        }
    }
}

/// Alternate router configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AltRouteConfig {
    /// Require the request method to equal the registered method.
    /// Off by default: pattern routes answer any method.
    pub match_method: bool,
}

/// Lifecycle timing.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// How long a background start waits for the listener to fail before
    /// reporting success, in milliseconds.
    pub init_timeout_ms: u64,

    /// Default graceful shutdown deadline in seconds.
    pub shutdown_timeout_secs: u64,
}

impl LifecycleConfig {
    pub fn init_timeout(&self) -> Duration {
        Duration::from_millis(self.init_timeout_ms)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            init_timeout_ms: 100,
            shutdown_timeout_secs: 10,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: ServerConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.robots.trust_header, "X-Robot");
        assert_eq!(config.robots.user_agents.len(), 7);
        assert!(config.access_log.enabled);
        assert!(!config.alt_routes.match_method);
        assert_eq!(config.lifecycle.init_timeout(), Duration::from_millis(100));
    }

    #[test]
    fn test_partial_sections() {
        let config: ServerConfig = toml::from_str(
            r#"
            [listener]
            bind_address = "127.0.0.1:9091"

            [robots]
            user_agents = ["Googlebot"]

            [access_log]
            format = "json"

            [alt_routes]
            match_method = true
            "#,
        )
        .unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9091");
        assert_eq!(config.robots.trust_header, "X-Robot");
        assert_eq!(config.robots.user_agents, vec!["Googlebot".to_string()]);
        assert_eq!(config.access_log.format, LogFormat::Json);
        assert!(config.access_log.enabled);
        assert!(config.alt_routes.match_method);
    }
}
