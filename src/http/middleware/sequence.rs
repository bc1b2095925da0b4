//! Sequence number assignment. First stage of the pipeline.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::http::request::{RequestContext, RequestCounter};

pub async fn sequence_middleware(
    State(counter): State<Arc<RequestCounter>>,
    mut req: Request,
    next: Next,
) -> Response {
    let ctx = RequestContext::new(counter.next());
    req.extensions_mut().insert(ctx);
    next.run(req).await
}
