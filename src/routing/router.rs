//! Alternate (pattern) router.
//!
//! # Responsibilities
//! - Store compiled pattern routes in registration order
//! - Dispatch a request the primary router could not place
//! - Report no-match explicitly so the caller picks the default response
//!
//! # Design Decisions
//! - Populated during registration only, read-only while serving
//!   (thread-safe without locks)
//! - O(n) linear scan; first registered match wins, never most-specific
//! - Method is recorded for every route but only checked when
//!   `match_method` is enabled

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use regex::Regex;
use tower::ServiceExt;

use crate::observability::metrics;
use crate::routing::matcher::{AndMatcher, Matcher, MethodMatcher, UriPatternMatcher};
use crate::routing::service::{wrap_handler_all, BoxedHandler, Middleware};
use crate::routing::RouteError;

/// A registered pattern route.
pub struct AltRoute {
    pattern: String,
    method: Method,
    matcher: Box<dyn Matcher>,
    handler: BoxedHandler,
}

impl AltRoute {
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn method(&self) -> &Method {
        &self.method
    }
}

impl std::fmt::Debug for AltRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AltRoute")
            .field("pattern", &self.pattern)
            .field("method", &self.method)
            .finish_non_exhaustive()
    }
}

/// Ordered list of pattern routes consulted on primary-router miss.
#[derive(Debug, Default)]
pub struct AltRouter {
    routes: Vec<AltRoute>,
    match_method: bool,
}

impl AltRouter {
    pub fn new(match_method: bool) -> Self {
        Self {
            routes: Vec::new(),
            match_method,
        }
    }

    /// Compile `pattern` and append the route. Middlewares run in the given
    /// order, then the handler.
    pub fn register(
        &mut self,
        pattern: &str,
        method: Method,
        handler: BoxedHandler,
        middlewares: &[Middleware],
    ) -> Result<(), RouteError> {
        let regex = Regex::new(pattern).map_err(|source| RouteError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;

        let uri_matcher = UriPatternMatcher::new(regex);
        let matcher: Box<dyn Matcher> = if self.match_method {
            Box::new(AndMatcher::new(vec![
                Box::new(uri_matcher),
                Box::new(MethodMatcher::new(method.clone())),
            ]))
        } else {
            Box::new(uri_matcher)
        };

        self.routes.push(AltRoute {
            pattern: pattern.to_string(),
            method,
            matcher,
            handler: wrap_handler_all(handler, middlewares),
        });
        Ok(())
    }

    /// First route matching `req`, if any.
    pub fn find(&self, req: &Request<Body>) -> Option<&AltRoute> {
        self.routes.iter().find(|route| route.matcher.matches(req))
    }

    /// Run the first matching route. `None` means no pattern matched and the
    /// request was not handled.
    pub async fn dispatch(&self, req: Request<Body>) -> Option<Response> {
        let Some(route) = self.find(&req) else {
            metrics::record_alt_dispatch(false);
            return None;
        };
        metrics::record_alt_dispatch(true);

        tracing::debug!(
            pattern = %route.pattern,
            uri = %req.uri(),
            "Alternate route matched"
        );

        match route.handler.clone().oneshot(req).await {
            Ok(response) => Some(response),
            Err(never) => match never {},
        }
    }

    pub fn routes(&self) -> &[AltRoute] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
