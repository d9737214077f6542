// HTTP routes and the request-recording middleware

mod http;
pub mod middleware;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::monitor::PerformanceMonitor;

pub use http::{NAME, VERSION};

#[derive(Clone)]
pub struct AppState {
    pub monitor: Arc<PerformanceMonitor>,
}

/// Read-only performance views, with every request (these included) recorded.
pub fn app(monitor: Arc<PerformanceMonitor>) -> Router {
    let state = AppState { monitor };
    Router::new()
        .route("/version", get(http::version_handler))
        .route("/api/performance/dashboard", get(http::dashboard_handler))
        .route("/api/performance/endpoints", get(http::endpoint_handler))
        .route("/api/performance/alerts", get(http::alerts_handler))
        .route("/api/performance/export", get(http::export_handler))
        .route("/api/performance/reset", post(http::reset_handler))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::record_performance,
        ))
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}

/// Adds request recording to an existing router.
pub fn with_recording<S>(router: Router<S>, monitor: Arc<PerformanceMonitor>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(axum::middleware::from_fn_with_state(
        AppState { monitor },
        middleware::record_performance,
    ))
}
