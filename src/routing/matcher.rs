//! Route matching logic for pattern routes.
//!
//! # Responsibilities
//! - Match a regular expression against the raw request URI
//! - Optionally match the request method
//! - Combine conditions with AND semantics
//!
//! # Design Decisions
//! - The URI is tested as received (path plus query), not normalized
//! - Unanchored search: a pattern matches if it occurs anywhere in the URI;
//!   anchor with `^`/`$` in the pattern itself for exact paths
//! - Method matching is a separate matcher so it can be left out

use std::borrow::Cow;

use axum::body::Body;
use axum::http::{Method, Request};
use regex::Regex;

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, req: &Request<Body>) -> bool;
}

/// The request target as the client sent it.
pub fn raw_uri(req: &Request<Body>) -> Cow<'_, str> {
    let uri = req.uri();
    match (uri.scheme(), uri.path_and_query()) {
        (None, Some(pq)) => Cow::Borrowed(pq.as_str()),
        _ => Cow::Owned(uri.to_string()),
    }
}

/// Matches a compiled regular expression against the raw URI.
#[derive(Debug, Clone)]
pub struct UriPatternMatcher {
    pattern: Regex,
}

impl UriPatternMatcher {
    pub fn new(pattern: Regex) -> Self {
        Self { pattern }
    }

    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }
}

impl Matcher for UriPatternMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        self.pattern.is_match(&raw_uri(req))
    }
}

/// Matches the request method exactly.
#[derive(Debug, Clone)]
pub struct MethodMatcher {
    method: Method,
}

impl MethodMatcher {
    pub fn new(method: Method) -> Self {
        Self { method }
    }
}

impl Matcher for MethodMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        req.method() == self.method
    }
}

/// Combines multiple matchers with AND semantics.
#[derive(Debug)]
pub struct AndMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl AndMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }
}

impl Matcher for AndMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        self.matchers.iter().all(|m| m.matches(req))
    }
}
