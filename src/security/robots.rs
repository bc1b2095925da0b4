//! Crawler detection.
//!
//! A request is a robot when it carries a non-empty trust header, or when its
//! `User-Agent` matches one of the configured crawler names (case-insensitive,
//! anywhere in the string).

use axum::http::{HeaderMap, HeaderName};
use regex::{Regex, RegexBuilder};

use crate::config::RobotConfig;
use crate::http::user_agent::user_agent_header;

/// Compiled crawler classifier. Immutable once built.
#[derive(Debug, Clone)]
pub struct RobotDetector {
    trust_header: HeaderName,
    patterns: Vec<Regex>,
}

impl RobotDetector {
    /// Compile the crawler list from configuration.
    pub fn new(config: &RobotConfig) -> Result<Self, RobotPatternError> {
        let trust_header = HeaderName::from_bytes(config.trust_header.as_bytes())
            .map_err(|_| RobotPatternError::TrustHeader(config.trust_header.clone()))?;

        let patterns = config
            .user_agents
            .iter()
            .map(|name| compile_crawler_pattern(name))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            trust_header,
            patterns,
        })
    }

    /// Classify a request by its headers.
    pub fn is_robot(&self, headers: &HeaderMap) -> bool {
        let asserted = headers
            .get(&self.trust_header)
            .map(|v| !v.is_empty())
            .unwrap_or(false);
        if asserted {
            return true;
        }

        user_agent_header(headers)
            .map(|ua| self.matches_user_agent(&ua))
            .unwrap_or(false)
    }

    /// Pattern-only check, ignoring the trust header.
    pub fn matches_user_agent(&self, user_agent: &str) -> bool {
        !user_agent.is_empty() && self.patterns.iter().any(|re| re.is_match(user_agent))
    }

    pub fn trust_header(&self) -> &HeaderName {
        &self.trust_header
    }
}

pub(crate) fn compile_crawler_pattern(name: &str) -> Result<Regex, RobotPatternError> {
    RegexBuilder::new(name)
        .case_insensitive(true)
        .build()
        .map_err(|source| RobotPatternError::Pattern {
            name: name.to_string(),
            source,
        })
}

/// Invalid crawler configuration.
#[derive(Debug, thiserror::Error)]
pub enum RobotPatternError {
    #[error("invalid trust header name: {0:?}")]
    TrustHeader(String),

    #[error("crawler pattern {name:?} does not compile: {source}")]
    Pattern {
        name: String,
        #[source]
        source: regex::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn detector() -> RobotDetector {
        RobotDetector::new(&RobotConfig::default()).unwrap()
    }

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (k, v) in pairs {
            let name = HeaderName::from_bytes(k.as_bytes()).unwrap();
            map.insert(name, HeaderValue::from_static(v));
        }
        map
    }

    #[test]
    fn test_trust_header_overrides_patterns() {
        let d = detector();
        assert!(d.is_robot(&headers(&[("x-robot", "1"), ("user-agent", "Mozilla/5.0")])));
        assert!(d.is_robot(&headers(&[("X-Robot", "yes")])));
    }

    #[test]
    fn test_empty_trust_header_is_ignored() {
        let d = detector();
        assert!(!d.is_robot(&headers(&[("x-robot", ""), ("user-agent", "Mozilla/5.0")])));
    }

    #[test]
    fn test_crawler_name_case_insensitive() {
        let d = detector();
        assert!(d.is_robot(&headers(&[("user-agent", "TelegramBot (like TwitterBot)")])));
        assert!(d.is_robot(&headers(&[("user-agent", "facebookexternalhit/1.1")])));
        assert!(d.is_robot(&headers(&[("user-agent", "wget/1.20.3 (linux-gnu)")])));
        assert!(d.matches_user_agent("WHATSAPP/2.21"));
    }

    #[test]
    fn test_crawler_with_non_ascii_user_agent() {
        let d = detector();
        let mut map = HeaderMap::new();
        map.insert(
            axum::http::header::USER_AGENT,
            HeaderValue::from_bytes("TelegramBot (like TwitterBot) Grüße".as_bytes()).unwrap(),
        );
        assert!(d.is_robot(&map));

        map.insert(
            axum::http::header::USER_AGENT,
            HeaderValue::from_bytes(b"Mozilla/5.0 \xe9 Firefox/89.0").unwrap(),
        );
        assert!(!d.is_robot(&map));
    }

    #[test]
    fn test_browser_is_not_robot() {
        let d = detector();
        assert!(!d.is_robot(&headers(&[(
            "user-agent",
            "Mozilla/5.0 (X11; Linux x86_64) Firefox/89.0"
        )])));
        assert!(!d.is_robot(&HeaderMap::new()));
        assert!(!d.matches_user_agent(""));
    }

    #[test]
    fn test_custom_trust_header() {
        let config = RobotConfig {
            trust_header: "X-Crawler".into(),
            user_agents: vec![],
        };
        let d = RobotDetector::new(&config).unwrap();
        assert!(d.is_robot(&headers(&[("x-crawler", "1")])));
        assert!(!d.is_robot(&headers(&[("x-robot", "1")])));
        assert!(!d.is_robot(&headers(&[("user-agent", "TelegramBot")])));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let config = RobotConfig {
            trust_header: "X-Robot".into(),
            user_agents: vec!["bot(".into()],
        };
        assert!(matches!(
            RobotDetector::new(&config),
            Err(RobotPatternError::Pattern { .. })
        ));
    }
}
