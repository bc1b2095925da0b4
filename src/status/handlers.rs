use axum::{extract::Request, http::HeaderValue, Json};
use serde::Serialize;

use crate::http::request::RequestContext;
use crate::http::user_agent::UserAgent;
use crate::routing::matcher::raw_uri;

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct WhoAmI {
    pub sequence: u64,
    pub robot: bool,
    pub user_agent: UserAgent,
}

#[derive(Debug, Serialize)]
pub struct StatusEntry {
    pub id: u64,
}

/// Liveness check. Polled often, so it stays out of the access log.
pub async fn get_health(ctx: RequestContext) -> Json<SystemStatus> {
    ctx.suppress_access_log();
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
    })
}

pub async fn get_whoami(ctx: RequestContext, user_agent: UserAgent) -> Json<WhoAmI> {
    Json(WhoAmI {
        sequence: ctx.sequence(),
        robot: ctx.is_robot(),
        user_agent,
    })
}

/// Pattern route for `/status/<id>`; the id is the first run of digits after
/// the prefix.
pub async fn get_status_entry(req: Request) -> Json<StatusEntry> {
    let uri = raw_uri(&req);
    let id = uri
        .split_once("/status/")
        .map(|(_, rest)| rest)
        .unwrap_or_default()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect::<String>()
        .parse()
        .unwrap_or_default();
    Json(StatusEntry { id })
}

pub(crate) fn no_store() -> HeaderValue {
    HeaderValue::from_static("no-store")
}
