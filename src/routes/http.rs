// GET/POST handlers: version and read-only performance views

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use super::AppState;
use crate::error::MonitorError;
use crate::monitor::DEFAULT_ALERT_LIMIT;

/// Package name and version (from Cargo.toml at build time).
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// JSON error body with a status code.
pub(super) struct ApiError(StatusCode, String);

impl From<MonitorError> for ApiError {
    fn from(e: MonitorError) -> Self {
        ApiError(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(serde_json::json!({ "error": self.1 }))).into_response()
    }
}

/// GET /version
pub(super) async fn version_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /api/performance/dashboard — captures live host counters, so it runs on the blocking pool.
pub(super) async fn dashboard_handler(State(state): State<AppState>) -> Result<Response, ApiError> {
    let monitor = state.monitor.clone();
    let dashboard = tokio::task::spawn_blocking(move || monitor.dashboard_data())
        .await
        .map_err(|e| MonitorError::Join(e.to_string()))??;
    Ok(Json(dashboard).into_response())
}

#[derive(Debug, Deserialize)]
pub(super) struct EndpointQuery {
    key: String,
}

/// GET /api/performance/endpoints?key=GET%20/api/users
pub(super) async fn endpoint_handler(
    State(state): State<AppState>,
    Query(q): Query<EndpointQuery>,
) -> Result<Response, ApiError> {
    match state.monitor.endpoint_stats(&q.key) {
        Some(stats) => Ok(Json(stats).into_response()),
        None => Err(ApiError(
            StatusCode::NOT_FOUND,
            format!("no samples for endpoint {}", q.key),
        )),
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct AlertsQuery {
    limit: Option<usize>,
}

/// GET /api/performance/alerts?limit=20
pub(super) async fn alerts_handler(
    State(state): State<AppState>,
    Query(q): Query<AlertsQuery>,
) -> impl IntoResponse {
    Json(
        state
            .monitor
            .recent_alerts(q.limit.unwrap_or(DEFAULT_ALERT_LIMIT)),
    )
}

/// GET /api/performance/export
pub(super) async fn export_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.monitor.export_performance_data())
}

/// POST /api/performance/reset
pub(super) async fn reset_handler(State(state): State<AppState>) -> impl IntoResponse {
    state.monitor.reset_metrics();
    StatusCode::NO_CONTENT
}
