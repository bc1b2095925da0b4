//! Application service registration interface.
//!
//! A service contributes exact-path routes to the primary router, pattern
//! routes to the alternate router, and middlewares that run ahead of both.

use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;

use axum::{
    extract::Request,
    handler::Handler,
    http::Method,
    middleware::{from_fn, Next},
    response::Response,
    Router,
};
use futures_util::future::BoxFuture;
use tower::util::BoxCloneSyncService;
use tower::Layer;

/// Type-erased request handler.
pub type BoxedHandler = BoxCloneSyncService<Request, Response, Infallible>;

/// Error returned from [`WebService::init`].
pub type InitError = Box<dyn std::error::Error + Send + Sync>;

/// A route contributed by a service.
///
/// For exact routes `path` is an axum path template; for alternate routes it
/// is a regular expression matched against the raw URI.
#[derive(Clone)]
pub struct WebRoute {
    pub path: String,
    pub method: Method,
    pub handler: BoxedHandler,
}

impl WebRoute {
    pub fn new<H, T>(path: impl Into<String>, method: Method, handler: H) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        Self {
            path: path.into(),
            method,
            handler: BoxCloneSyncService::new(handler.with_state(())),
        }
    }

    pub fn get<H, T>(path: impl Into<String>, handler: H) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        Self::new(path, Method::GET, handler)
    }

    pub fn post<H, T>(path: impl Into<String>, handler: H) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        Self::new(path, Method::POST, handler)
    }
}

impl std::fmt::Debug for WebRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebRoute")
            .field("path", &self.path)
            .field("method", &self.method)
            .finish_non_exhaustive()
    }
}

type MiddlewareFn = dyn Fn(Request, Next) -> BoxFuture<'static, Response> + Send + Sync;

/// A service-level middleware in `axum::middleware::from_fn` form.
#[derive(Clone)]
pub struct Middleware {
    f: Arc<MiddlewareFn>,
}

impl Middleware {
    pub fn from_fn<F, Fut>(f: F) -> Self
    where
        F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        Self {
            f: Arc::new(move |req, next| Box::pin(f(req, next))),
        }
    }

    /// Wrap every route currently in `router`.
    pub(crate) fn wrap_router(&self, router: Router) -> Router {
        let f = self.f.clone();
        router.layer(from_fn(move |req: Request, next: Next| f(req, next)))
    }

    /// Wrap a single handler.
    pub(crate) fn wrap_handler(&self, handler: BoxedHandler) -> BoxedHandler {
        let f = self.f.clone();
        BoxCloneSyncService::new(from_fn(move |req: Request, next: Next| f(req, next)).layer(handler))
    }
}

impl std::fmt::Debug for Middleware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Middleware")
    }
}

/// Apply `middlewares` so that the first one runs first.
pub(crate) fn wrap_handler_all(handler: BoxedHandler, middlewares: &[Middleware]) -> BoxedHandler {
    middlewares
        .iter()
        .rev()
        .fold(handler, |inner, mw| mw.wrap_handler(inner))
}

/// Router-level counterpart of [`wrap_handler_all`].
pub(crate) fn wrap_router_all(router: Router, middlewares: &[Middleware]) -> Router {
    middlewares
        .iter()
        .rev()
        .fold(router, |inner, mw| mw.wrap_router(inner))
}

/// An independently authored unit of routes and middlewares.
pub trait WebService: Send + 'static {
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Exact-path routes for the primary router.
    fn routes(&self) -> Vec<WebRoute>;

    /// Pattern routes for the alternate router.
    fn alt_routes(&self) -> Vec<WebRoute> {
        Vec::new()
    }

    /// Middlewares applied ahead of this service's handlers.
    fn middlewares(&self) -> Vec<Middleware> {
        Vec::new()
    }

    /// Called once at registration, before any route is added.
    /// A failure is logged and registration carries on.
    fn init(&mut self, _router: &mut Router) -> Result<(), InitError> {
        Ok(())
    }
}
