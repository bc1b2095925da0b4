//! Robot classification middleware.
//! Runs before dispatch so handlers can branch on `RequestContext::is_robot`.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::http::request::RequestContext;
use crate::observability::metrics;
use crate::security::robots::RobotDetector;

pub async fn robots_middleware(
    State(detector): State<Arc<RobotDetector>>,
    mut req: Request,
    next: Next,
) -> Response {
    let robot = detector.is_robot(req.headers());
    if robot {
        metrics::record_robot();
    }

    if let Some(ctx) = req.extensions_mut().get_mut::<RequestContext>() {
        ctx.set_robot(robot);
    }

    next.run(req).await
}
