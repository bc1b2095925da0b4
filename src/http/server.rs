//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Register application services on the primary axum Router
//! - Collect pattern routes into the alternate router
//! - Wire up the fixed middleware pipeline around both routers
//! - Bind and serve (blocking mode; background mode lives in `lifecycle`)

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::Request,
    http::Method,
    middleware::from_fn_with_state,
    routing::{on_service, MethodFilter},
    Router,
};
use regex::Regex;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;

use crate::config::ServerConfig;
use crate::http::middleware::{
    access_log_middleware, robots_middleware, sequence_middleware, AccessLogSink, AccessLogState,
    TracingSink,
};
use crate::http::request::RequestCounter;
use crate::http::response::{not_found, panic_response};
use crate::lifecycle::signals::shutdown_signal;
use crate::routing::service::wrap_router_all;
use crate::routing::{AltRouter, RouteError, WebService};
use crate::security::robots::{RobotDetector, RobotPatternError};

/// Errors surfaced to whoever builds or runs the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Route(#[from] RouteError),

    #[error("invalid robot configuration: {0}")]
    RobotPattern(#[from] RobotPatternError),

    #[error("can't bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("can't start web server: {0}")]
    Startup(#[source] std::io::Error),

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),

    #[error("graceful shutdown did not finish within {0:?}")]
    ShutdownTimeout(Duration),

    #[error("server task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl ServerError {
    /// True for failures of the listener to come up.
    pub fn is_startup_fault(&self) -> bool {
        matches!(self, ServerError::Bind { .. } | ServerError::Startup(_))
    }
}

/// Web server with a primary router, an alternate pattern router and the
/// request classification pipeline.
pub struct WebServer {
    config: ServerConfig,
    primary: Router,
    alt: AltRouter,
    counter: Arc<RequestCounter>,
    robots: Arc<RobotDetector>,
    access_sink: Arc<dyn AccessLogSink>,
    exact_routes: HashSet<(Method, String)>,
    exact_paths: HashMap<String, String>,
}

impl WebServer {
    /// Create a new server with the given configuration.
    pub fn new(config: ServerConfig) -> Result<Self, ServerError> {
        let robots = Arc::new(RobotDetector::new(&config.robots)?);
        let alt = AltRouter::new(config.alt_routes.match_method);

        Ok(Self {
            config,
            primary: Router::new(),
            alt,
            counter: Arc::new(RequestCounter::new()),
            robots,
            access_sink: Arc::new(TracingSink),
            exact_routes: HashSet::new(),
            exact_paths: HashMap::new(),
        })
    }

    /// Replace the access log sink.
    pub fn with_access_sink(mut self, sink: impl AccessLogSink) -> Self {
        self.access_sink = Arc::new(sink);
        self
    }

    /// Register a service. Exact routes go under `/group` when `group` is
    /// non-empty; pattern routes are matched against the full URI regardless.
    pub fn register<S: WebService>(&mut self, group: &str, mut service: S) -> Result<(), ServerError> {
        let name = service.name().to_string();

        if let Err(e) = service.init(&mut self.primary) {
            tracing::error!(service = %name, error = %e, "Can't initialize web service");
        }

        let middlewares = service.middlewares();

        let routes = service.routes();
        let route_count = routes.len();

        // Everything is checked before the router is touched; axum panics on
        // paths it rejects and on overlapping method routes.
        let mut checked = Vec::with_capacity(routes.len());
        let mut keys = HashSet::new();
        let mut shapes: HashMap<String, String> = HashMap::new();
        for route in routes {
            let path = group_path(group, &route.path)?;
            let filter = MethodFilter::try_from(route.method.clone()).map_err(|_| {
                RouteError::UnsupportedMethod {
                    method: route.method.to_string(),
                    path: path.clone(),
                }
            })?;
            let shape = route_shape(&path)?;
            let existing = self.exact_paths.get(&shape).or_else(|| shapes.get(&shape));
            if let Some(existing) = existing.filter(|existing| **existing != path) {
                return Err(RouteError::Conflict {
                    path,
                    existing: existing.clone(),
                }
                .into());
            }
            shapes.insert(shape.clone(), path.clone());

            let key = (route.method.clone(), shape);
            if self.exact_routes.contains(&key) || !keys.insert(key) {
                return Err(RouteError::Duplicate {
                    method: route.method.to_string(),
                    path,
                }
                .into());
            }
            checked.push((path, filter, route.handler));
        }

        let alt_routes = service.alt_routes();
        let alt_count = alt_routes.len();
        for route in &alt_routes {
            Regex::new(&route.path).map_err(|source| RouteError::InvalidPattern {
                pattern: route.path.clone(),
                source,
            })?;
        }

        if !checked.is_empty() {
            let mut sub = Router::new();
            for (path, filter, handler) in checked {
                sub = sub.route(&path, on_service(filter, handler));
            }
            let sub = wrap_router_all(sub, &middlewares);
            self.primary = std::mem::take(&mut self.primary).merge(sub);
            self.exact_routes.extend(keys);
            self.exact_paths.extend(shapes);
        }

        for route in alt_routes {
            self.alt
                .register(&route.path, route.method, route.handler, &middlewares)?;
        }

        tracing::info!(
            service = %name,
            group = %group,
            routes = route_count,
            alt_routes = alt_count,
            middlewares = middlewares.len(),
            "Web service registered"
        );
        Ok(())
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Shared request counter, for inspection.
    pub fn counter(&self) -> Arc<RequestCounter> {
        self.counter.clone()
    }

    pub fn alt_router(&self) -> &AltRouter {
        &self.alt
    }

    /// Assemble the final router:
    /// sequence → access log → robots → panic barrier → primary router,
    /// falling back to the alternate router, then 404.
    pub fn into_router(self) -> Router {
        let Self {
            config,
            primary,
            alt,
            counter,
            robots,
            access_sink,
            ..
        } = self;

        let alt = Arc::new(alt);
        let fallback = move |req: Request| {
            let alt = alt.clone();
            async move { alt.dispatch(req).await.unwrap_or_else(not_found) }
        };

        let access_state = AccessLogState {
            sink: access_sink,
            enabled: config.access_log.enabled,
        };

        primary
            .fallback(fallback.clone())
            .method_not_allowed_fallback(fallback)
            .layer(
                ServiceBuilder::new()
                    .layer(from_fn_with_state(counter, sequence_middleware))
                    .layer(from_fn_with_state(access_state, access_log_middleware))
                    .layer(from_fn_with_state(robots, robots_middleware))
                    .layer(CatchPanicLayer::custom(panic_response)),
            )
    }

    /// Run in the foreground until SIGINT/SIGTERM, then drain.
    pub async fn run(self) -> Result<(), ServerError> {
        let address = self.config.listener.bind_address.clone();
        tracing::info!(address = %address, "Starting listener");

        let listener = bind(&address).await?;
        let local_addr = listener.local_addr().map_err(ServerError::Serve)?;
        tracing::info!(address = %local_addr, "webserver listening");

        let app = self
            .into_router()
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(ServerError::Serve)?;

        tracing::info!("webserver stopped");
        Ok(())
    }
}

pub(crate) async fn bind(address: &str) -> Result<TcpListener, ServerError> {
    TcpListener::bind(address).await.map_err(|source| {
        tracing::error!(address = %address, error = %source, "webserver startup error");
        ServerError::Bind {
            address: address.to_string(),
            source,
        }
    })
}

fn group_path(group: &str, path: &str) -> Result<String, RouteError> {
    if !path.starts_with('/') {
        return Err(RouteError::InvalidPath {
            path: path.to_string(),
            reason: "must start with '/'",
        });
    }
    let group = group.trim_matches('/');
    if group.is_empty() {
        Ok(path.to_string())
    } else {
        Ok(format!("/{}{}", group, path))
    }
}

/// Validate an exact route path and reduce it to the shape the axum router
/// matches on: capture names are erased, so `/u/{id}` and `/u/{name}` collide.
fn route_shape(path: &str) -> Result<String, RouteError> {
    let invalid = |reason| RouteError::InvalidPath {
        path: path.to_string(),
        reason,
    };

    let mut segments = Vec::new();
    for segment in path.split('/') {
        if segment.starts_with(':') || segment.starts_with('*') {
            return Err(invalid("captures use `{name}` or `{*name}`, not `:name` or `*name`"));
        }
        if segment.starts_with("{*") && segment.ends_with('}') {
            segments.push("{*}");
        } else if segment.starts_with('{') && segment.ends_with('}') {
            if segment.len() == 2 {
                return Err(invalid("capture name must not be empty"));
            }
            segments.push("{}");
        } else if segment.contains(['{', '}']) {
            return Err(invalid("a capture must span the whole segment"));
        } else {
            segments.push(segment);
        }
    }
    Ok(segments.join("/"))
}
