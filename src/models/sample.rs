// Per-request performance sample

use serde::{Deserialize, Serialize};

/// Builds the key samples are grouped under, e.g. `"GET /api/users"`.
///
/// The method appears once. Some dashboards built against older output
/// expect `"GET GET /api/users"`; that form is not produced here.
pub fn endpoint_key(method: &str, path: &str) -> String {
    // Uppercased so `get` and `GET` land under one key.
    format!("{} {}", method.to_uppercase(), path)
}

/// Process memory counters at sample time (bytes).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessMemory {
    pub resident_bytes: u64,
    pub virtual_bytes: u64,
}

/// Process CPU counters at sample time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessCpu {
    /// Total CPU time consumed by the process since it started.
    pub accumulated_cpu_ms: u64,
    pub run_time_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSample {
    pub endpoint_key: String,
    pub method: String,
    pub response_time_ms: u64,
    pub status_code: u16,
    pub db_connections: u32,
    /// Server fault only (5xx). Endpoint error rates count every 4xx/5xx.
    pub is_error: bool,
    pub memory_snapshot: ProcessMemory,
    pub cpu_snapshot: ProcessCpu,
    pub timestamp: u64,
}

impl PerformanceSample {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        path: &str,
        method: &str,
        response_time_ms: u64,
        status_code: u16,
        db_connections: u32,
        memory_snapshot: ProcessMemory,
        cpu_snapshot: ProcessCpu,
        timestamp: u64,
    ) -> Self {
        Self {
            endpoint_key: endpoint_key(method, path),
            method: method.to_uppercase(),
            response_time_ms,
            status_code,
            db_connections,
            is_error: status_code >= 500,
            memory_snapshot,
            cpu_snapshot,
            timestamp,
        }
    }

    /// Counted as failed in endpoint and export error rates.
    pub fn is_failure(&self) -> bool {
        self.status_code >= 400
    }
}
