//! Built-in status service.
//!
//! ```text
//! GET /health              → version + status, never access-logged
//! GET /whoami              → sequence, robot flag, parsed user agent
//! *   ^/status/[0-9]+      → pattern route echoing the numeric id
//! ```
//!
//! Every response carries `Cache-Control: no-store`.

pub mod handlers;

use axum::{extract::Request, http::header::CACHE_CONTROL, middleware::Next};

use crate::routing::{Middleware, WebRoute, WebService};
use self::handlers::*;

#[derive(Debug, Default)]
pub struct StatusService;

impl WebService for StatusService {
    fn name(&self) -> &str {
        "status"
    }

    fn routes(&self) -> Vec<WebRoute> {
        vec![
            WebRoute::get("/health", get_health),
            WebRoute::get("/whoami", get_whoami),
        ]
    }

    fn alt_routes(&self) -> Vec<WebRoute> {
        vec![WebRoute::get("^/status/[0-9]+", get_status_entry)]
    }

    fn middlewares(&self) -> Vec<Middleware> {
        vec![Middleware::from_fn(|req: Request, next: Next| async move {
            let mut response = next.run(req).await;
            response.headers_mut().insert(CACHE_CONTROL, no_store());
            response
        })]
    }
}
