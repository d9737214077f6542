// Derived per-endpoint statistics

use serde::{Deserialize, Serialize};

/// Aggregates over every retained sample of one endpoint. Recomputed per read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointStats {
    pub endpoint_key: String,
    pub total_requests: u64,
    /// Samples with status >= 400.
    pub error_count: u64,
    pub error_rate: f64,
    pub average_response_time_ms: f64,
    pub min_response_time_ms: u64,
    pub max_response_time_ms: u64,
    pub p95_response_time_ms: u64,
    pub p99_response_time_ms: u64,
    pub requests_per_minute: u64,
    pub last_updated_at: u64,
}
