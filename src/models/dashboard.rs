// Read-side views: dashboard snapshot and raw export

use serde::Serialize;

use super::{Alert, EndpointStats, PerformanceSample, SystemSnapshot};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub system_metrics: SystemSnapshot,
    pub endpoint_stats: Vec<EndpointStats>,
    /// Last 10 alerts, oldest first.
    pub recent_alerts: Vec<Alert>,
    /// Last 100 samples, oldest first.
    pub performance_timeline: Vec<PerformanceSample>,
    pub recommendations: Vec<String>,
}

/// Totals across all retained samples regardless of endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSummary {
    pub total_requests: u64,
    pub average_response_time_ms: f64,
    pub error_rate: f64,
    pub uptime_ms: u64,
    pub start_time: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    pub metrics: Vec<PerformanceSample>,
    pub endpoint_stats: Vec<EndpointStats>,
    pub alerts: Vec<Alert>,
    pub system_info: ExportSummary,
}
