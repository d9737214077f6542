// Host/process resource snapshot

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuUsage {
    /// Process CPU usage since the previous reading, 0..=100 across all cores.
    pub usage_percent: f64,
    /// 1, 5 and 15 minute load averages.
    pub load_average: [f64; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryUsage {
    pub total_mb: u64,
    pub used_mb: u64,
    pub free_mb: u64,
    pub process_resident_mb: u64,
    /// `NaN` when the host reports zero total memory (serialized as `null`).
    pub usage_percent: f64,
}

/// Connection counts are not measured; only the request rate is real.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkUsage {
    pub active_connections: u32,
    pub requests_per_second: u32,
}

/// Placeholder; populated by a database collaborator when one exists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseUsage {
    pub active_connections: u32,
    pub query_execution_time_ms: u64,
    pub slow_queries: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemSnapshot {
    pub timestamp: u64,
    pub cpu: CpuUsage,
    pub memory: MemoryUsage,
    pub network: NetworkUsage,
    pub database: DatabaseUsage,
}
