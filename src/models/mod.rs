// Domain models: request samples, system snapshots, derived stats, alerts

mod alert;
mod dashboard;
mod sample;
mod stats;
mod system;

pub use alert::{Alert, AlertKind, AlertSeverity};
pub use dashboard::{DashboardSnapshot, ExportBundle, ExportSummary};
pub use sample::{PerformanceSample, ProcessCpu, ProcessMemory, endpoint_key};
pub use stats::EndpointStats;
pub use system::{CpuUsage, DatabaseUsage, MemoryUsage, NetworkUsage, SystemSnapshot};

/// Milliseconds since the Unix epoch; 0 (with a warning) if the clock is before it.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, operation = "get_timestamp", "system time error");
            0
        })
}
