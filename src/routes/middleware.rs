// Request timing middleware: one `record_request` per completed request.

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};

use super::AppState;

/// Times the inner service and records the sample under the matched route
/// template (e.g. `/api/users/{id}`), falling back to the raw path.
pub async fn record_performance(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let method = req.method().as_str().to_owned();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned());

    let start = Instant::now();
    let response = next.run(req).await;
    let elapsed_ms = start.elapsed().as_millis() as u64;

    state
        .monitor
        .record_request(&path, &method, elapsed_ms, response.status().as_u16());
    response
}
