// Integration tests: HTTP routes and the recording middleware

mod common;

use axum::{Router, http::StatusCode, routing::get};
use axum_test::TestServer;
use common::{FakeHost, monitor, monitor_with};
use perfwatch::models::{Alert, EndpointStats};
use perfwatch::routes;

fn test_server() -> (TestServer, std::sync::Arc<perfwatch::PerformanceMonitor>) {
    let m = monitor();
    let server = TestServer::new(routes::app(m.clone()));
    (server, m)
}

#[tokio::test]
async fn test_version_endpoint() {
    let (server, _) = test_server();
    let response = server.get("/version").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(json.get("name").and_then(|v| v.as_str()), Some("perfwatch"));
    assert!(json.get("version").and_then(|v| v.as_str()).is_some());
}

#[tokio::test]
async fn test_requests_are_recorded_under_matched_route() {
    let (server, m) = test_server();
    server.get("/version").await.assert_status_ok();
    server.get("/version").await.assert_status_ok();

    let stats = m.endpoint_stats("GET /version").unwrap();
    assert_eq!(stats.total_requests, 2);
    assert_eq!(stats.error_count, 0);
}

#[tokio::test]
async fn test_middleware_on_host_router_records_status() {
    let m = monitor();
    let host_app = Router::new()
        .route("/api/users/{id}", get(|| async { "user" }))
        .route(
            "/api/broken",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
    let server = TestServer::new(routes::with_recording(host_app, m.clone()));

    server.get("/api/users/1").await.assert_status_ok();
    server.get("/api/users/2").await.assert_status_ok();
    server
        .get("/api/broken")
        .await
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR);

    let users = m.endpoint_stats("GET /api/users/{id}").unwrap();
    assert_eq!(users.total_requests, 2);
    let broken = m.endpoint_stats("GET /api/broken").unwrap();
    assert_eq!(broken.error_count, 1);

    let export = m.export_performance_data();
    assert_eq!(export.metrics.len(), 3);
    assert!(export.metrics[2].is_error);
}

#[tokio::test]
async fn test_dashboard_endpoint() {
    let (server, m) = test_server();
    m.record_request("/api/report", "GET", 6000, 200);

    let response = server.get("/api/performance/dashboard").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert!(json["systemMetrics"]["memory"]["usagePercent"].is_number());
    assert_eq!(json["endpointStats"][0]["endpointKey"], "GET /api/report");
    assert_eq!(json["recentAlerts"][0]["severity"], "CRITICAL");
    assert_eq!(json["performanceTimeline"].as_array().unwrap().len(), 1);
    assert!(json["recommendations"].as_array().unwrap().len() >= 2);
}

#[tokio::test]
async fn test_dashboard_endpoint_surfaces_capture_failure() {
    let host = FakeHost::idle();
    host.set_failing(true);
    let server = TestServer::new(routes::app(monitor_with(host)));
    let response = server.get("/api/performance/dashboard").await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let json: serde_json::Value = response.json();
    assert!(json["error"].as_str().unwrap().contains("host counters"));
}

#[tokio::test]
async fn test_endpoint_lookup_hit_and_miss() {
    let (server, m) = test_server();
    m.record_request("/api/users", "GET", 100, 200);

    let response = server
        .get("/api/performance/endpoints")
        .add_query_param("key", "GET /api/users")
        .await;
    response.assert_status_ok();
    let stats: EndpointStats = response.json();
    assert_eq!(stats.total_requests, 1);

    server
        .get("/api/performance/endpoints")
        .add_query_param("key", "nonexistent")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_alerts_endpoint_limit() {
    let (server, m) = test_server();
    for i in 0..5 {
        m.record_request(&format!("/slow/{}", i), "GET", 1500, 200);
    }
    let response = server
        .get("/api/performance/alerts")
        .add_query_param("limit", 2)
        .await;
    response.assert_status_ok();
    let alerts: Vec<Alert> = response.json();
    assert_eq!(alerts.len(), 2);
    assert_eq!(alerts[1].endpoint_key.as_deref(), Some("GET /slow/4"));

    let all: Vec<Alert> = server.get("/api/performance/alerts").await.json();
    assert_eq!(all.len(), 5);
}

#[tokio::test]
async fn test_export_and_reset() {
    let (server, m) = test_server();
    m.record_request("/a", "GET", 100, 200);
    m.record_request("/a", "GET", 300, 500);

    let export: serde_json::Value = server.get("/api/performance/export").await.json();
    assert_eq!(export["systemInfo"]["totalRequests"], 2);
    assert_eq!(export["systemInfo"]["averageResponseTimeMs"], 200.0);
    assert_eq!(export["systemInfo"]["errorRate"], 50.0);

    server
        .post("/api/performance/reset")
        .await
        .assert_status(StatusCode::NO_CONTENT);
    assert!(m.endpoint_stats("GET /a").is_none());
}
