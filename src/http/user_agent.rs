//! Browser identification from the `User-Agent` header.
//!
//! # Responsibilities
//! - Map a raw user-agent string to a browser family and version triple
//! - Expose the result as an axum extractor for handlers
//!
//! # Design Decisions
//! - Small fixed pattern table (subset of uap-core), not a full UA database
//! - Ordered table, first match wins: WebView and mobile signatures are
//!   tested before the generic Chrome signature they would otherwise hit
//! - Table compiled once on first use and shared read-only afterwards
//! - Unparseable version components become 0 instead of failing the parse

use std::borrow::Cow;
use std::convert::Infallible;
use std::fmt;

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, HeaderMap};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Serializer};

/// Browser families the classifier knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    MiuiBrowser,
    YandexBrowser,
    ChromeMobileWebView,
    ChromeMobileIos,
    ChromeMobile,
    Chrome,
    Firefox,
    Other,
}

impl Family {
    pub fn as_str(&self) -> &'static str {
        match self {
            Family::MiuiBrowser => "MiuiBrowser",
            Family::YandexBrowser => "Yandex Browser",
            Family::ChromeMobileWebView => "Chrome Mobile WebView",
            Family::ChromeMobileIos => "Chrome Mobile iOS",
            Family::ChromeMobile => "Chrome Mobile",
            Family::Chrome => "Chrome",
            Family::Firefox => "Firefox",
            Family::Other => "OTHER",
        }
    }
}

impl Serialize for Family {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed browser identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserAgent {
    pub family: Family,
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl UserAgent {
    /// The sentinel returned when nothing in the table matches.
    pub fn other() -> Self {
        Self {
            family: Family::Other,
            major: 0,
            minor: 0,
            patch: 0,
        }
    }

    /// Parse a raw user-agent string.
    pub fn parse(raw: &str) -> Self {
        for (family, pattern) in UA_TABLE.iter() {
            // Group 1 is the product token, groups 2..=4 the version triple.
            if let Some(caps) = pattern.captures(raw) {
                let version = |idx: usize| {
                    caps.get(idx)
                        .and_then(|m| m.as_str().parse::<u64>().ok())
                        .unwrap_or(0)
                };
                return Self {
                    family: *family,
                    major: version(2),
                    minor: version(3),
                    patch: version(4),
                };
            }
        }
        Self::other()
    }

    /// True if the family is any of `families`.
    pub fn is(&self, families: &[Family]) -> bool {
        families.contains(&self.family)
    }
}

impl Default for UserAgent {
    fn default() -> Self {
        Self::other()
    }
}

const UA_PATTERNS: &[(Family, &str)] = &[
    (Family::MiuiBrowser, r"(MiuiBrowser)/(\d+)\.(\d+)\.(\d+)"),
    (Family::YandexBrowser, r"(YaBrowser)/(\d+)\.(\d+)\.(\d+)"),
    (Family::ChromeMobileWebView, r"Version/.+(Chrome)/(\d+)\.(\d+)\.(\d+)\.(\d+)"),
    (Family::ChromeMobileWebView, r"; wv\).+(Chrome)/(\d+)\.(\d+)\.(\d+)\.(\d+)"),
    (Family::ChromeMobileIos, r"(CriOS)/(\d+)\.(\d+)\.(\d+)\.(\d+)"),
    (Family::ChromeMobile, r"(Chrome)/(\d+)\.(\d+)\.(\d+)\.(\d+) Mobile(?:[ /]|$)"),
    (Family::Chrome, r"(Chromium|Chrome)/(\d+)\.(\d+)(?:\.(\d+))?(?:\.(\d+))?"),
    (Family::Firefox, r"(Firefox)/(\d+)\.(\d+)"),
];

static UA_TABLE: Lazy<Vec<(Family, Regex)>> = Lazy::new(|| {
    UA_PATTERNS
        .iter()
        .map(|(family, pattern)| {
            (
                *family,
                Regex::new(pattern).expect("Failed to compile user-agent pattern"),
            )
        })
        .collect()
});

/// The `User-Agent` header as text. Bytes that are not valid UTF-8 are
/// replaced rather than causing the whole header to be ignored.
pub fn user_agent_header(headers: &HeaderMap) -> Option<Cow<'_, str>> {
    headers
        .get(header::USER_AGENT)
        .map(|v| String::from_utf8_lossy(v.as_bytes()))
}

impl<S> FromRequestParts<S> for UserAgent
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(user_agent_header(&parts.headers)
            .map(|ua| UserAgent::parse(&ua))
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANDROID_CHROME: &str = "Mozilla/5.0 (Linux; Android 10; SM-G975F) AppleWebKit/537.36 \
        (KHTML, like Gecko) Chrome/91.0.4472.124 Mobile Safari/537.36";

    #[test]
    fn test_pattern_table_compiles() {
        assert_eq!(UA_TABLE.len(), UA_PATTERNS.len());
    }

    #[test]
    fn test_chrome_mobile() {
        let ua = UserAgent::parse(ANDROID_CHROME);
        assert_eq!(ua.family, Family::ChromeMobile);
        assert_eq!((ua.major, ua.minor, ua.patch), (91, 0, 4472));
        assert_eq!(ua.family.to_string(), "Chrome Mobile");
    }

    #[test]
    fn test_firefox() {
        let ua = UserAgent::parse(
            "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:89.0) Gecko/20100101 Firefox/89.0",
        );
        assert_eq!(ua.family, Family::Firefox);
        assert_eq!((ua.major, ua.minor, ua.patch), (89, 0, 0));
    }

    #[test]
    fn test_unknown_is_other() {
        assert_eq!(UserAgent::parse("curl/7.64"), UserAgent::other());
        assert_eq!(UserAgent::parse(""), UserAgent::other());
        assert_eq!(UserAgent::other().family.as_str(), "OTHER");
    }

    #[test]
    fn test_webview_before_chrome() {
        let wv = UserAgent::parse(
            "Mozilla/5.0 (Linux; Android 11; Pixel 5 Build/RQ3A; wv) AppleWebKit/537.36 \
             (KHTML, like Gecko) Version/4.0 Chrome/90.0.4430.91 Mobile Safari/537.36",
        );
        assert_eq!(wv.family, Family::ChromeMobileWebView);
        assert_eq!((wv.major, wv.minor, wv.patch), (90, 0, 4430));

        let wv_no_version = UserAgent::parse(
            "Mozilla/5.0 (Linux; Android 9; wv) AppleWebKit/537.36 Chrome/88.0.4324.181 Mobile",
        );
        assert_eq!(wv_no_version.family, Family::ChromeMobileWebView);
    }

    #[test]
    fn test_vendor_browsers() {
        let miui = UserAgent::parse(
            "Mozilla/5.0 (Linux; U; Android 10) Chrome/89.0.4389.116 Mobile Safari/537.36 XiaoMi/MiuiBrowser/15.7.22",
        );
        assert_eq!(miui.family, Family::MiuiBrowser);
        assert_eq!((miui.major, miui.minor, miui.patch), (15, 7, 22));

        let yandex = UserAgent::parse(
            "Mozilla/5.0 (Windows NT 10.0) Chrome/92.0.4515.159 YaBrowser/21.8.1.468 Safari/537.36",
        );
        assert_eq!(yandex.family, Family::YandexBrowser);
        assert_eq!((yandex.major, yandex.minor, yandex.patch), (21, 8, 1));

        let ios = UserAgent::parse(
            "Mozilla/5.0 (iPhone; CPU iPhone OS 14_6 like Mac OS X) CriOS/91.0.4472.80 Mobile/15E148",
        );
        assert_eq!(ios.family, Family::ChromeMobileIos);
        assert_eq!(ios.major, 91);
    }

    #[test]
    fn test_desktop_chrome_and_chromium() {
        let desktop = UserAgent::parse(
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) Chrome/91.0.4472.124 Safari/537.36",
        );
        assert_eq!(desktop.family, Family::Chrome);
        assert_eq!((desktop.major, desktop.minor, desktop.patch), (91, 0, 4472));

        let chromium = UserAgent::parse("Mozilla/5.0 (X11; Linux) Chromium/72.0");
        assert_eq!(chromium.family, Family::Chrome);
        assert_eq!((chromium.major, chromium.minor, chromium.patch), (72, 0, 0));
    }

    #[test]
    fn test_version_overflow_defaults_to_zero() {
        let ua = UserAgent::parse("Firefox/99999999999999999999999.3");
        assert_eq!(ua.family, Family::Firefox);
        assert_eq!((ua.major, ua.minor), (0, 3));
    }

    #[test]
    fn test_is() {
        let ua = UserAgent::parse(ANDROID_CHROME);
        assert!(ua.is(&[Family::Chrome, Family::ChromeMobile]));
        assert!(!ua.is(&[Family::Firefox]));
        assert!(!ua.is(&[]));
    }

    #[tokio::test]
    async fn test_extractor_keeps_non_ascii_header() {
        let request = axum::http::Request::builder()
            .header(
                header::USER_AGENT,
                axum::http::HeaderValue::from_bytes(
                    "Mozilla/5.0 (X11; Linux x86_64; rv:89.0) Gecko/20100101 Firefox/89.0 Grüße".as_bytes(),
                )
                .unwrap(),
            )
            .body(())
            .unwrap();
        let (mut parts, _) = request.into_parts();

        let ua = UserAgent::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(ua.family, Family::Firefox);
        assert_eq!(ua.major, 89);
    }

    #[test]
    fn test_user_agent_header_lossy() {
        let mut headers = HeaderMap::new();
        assert!(user_agent_header(&headers).is_none());

        headers.insert(
            header::USER_AGENT,
            axum::http::HeaderValue::from_bytes(b"Viber \xff/14").unwrap(),
        );
        let ua = user_agent_header(&headers).unwrap();
        assert!(ua.starts_with("Viber "));
        assert!(ua.ends_with("/14"));
    }

    #[test]
    fn test_parse_is_idempotent() {
        assert_eq!(UserAgent::parse(ANDROID_CHROME), UserAgent::parse(ANDROID_CHROME));
    }
}
