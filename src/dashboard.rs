// Recommendation rules for the dashboard view.

use crate::alerts::{CPU_PERCENT, ERROR_RATE_PERCENT, MEMORY_PERCENT, RESPONSE_TIME_MS};
use crate::models::{Alert, AlertSeverity, EndpointStats, SystemSnapshot};

/// Retained samples at which an endpoint counts as high traffic.
pub const HIGH_TRAFFIC_SAMPLES: u64 = 100;

/// Every rule is evaluated on every call; output order follows the rule order.
pub fn recommendations(
    endpoint_stats: &[EndpointStats],
    recent_alerts: &[Alert],
    system: &SystemSnapshot,
) -> Vec<String> {
    let mut out = Vec::new();

    let slow = endpoint_stats
        .iter()
        .filter(|s| s.average_response_time_ms > RESPONSE_TIME_MS.warning)
        .count();
    if slow > 0 {
        out.push(format!(
            "Consider optimizing {} slow endpoint(s) with >1s average response time",
            slow
        ));
    }

    let error_prone: Vec<&str> = endpoint_stats
        .iter()
        .filter(|s| s.error_rate > ERROR_RATE_PERCENT.warning)
        .map(|s| s.endpoint_key.as_str())
        .collect();
    if !error_prone.is_empty() {
        out.push(format!(
            "Investigate high error rate (>5%) on: {}",
            error_prone.join(", ")
        ));
    }

    let high_traffic = endpoint_stats
        .iter()
        .filter(|s| s.total_requests >= HIGH_TRAFFIC_SAMPLES)
        .count();
    if high_traffic > 0 {
        out.push(format!(
            "Consider caching for {} high-traffic endpoint(s)",
            high_traffic
        ));
    }

    let critical = recent_alerts
        .iter()
        .filter(|a| a.severity == AlertSeverity::Critical)
        .count();
    if critical > 0 {
        out.push(format!(
            "Address {} critical performance issue(s) among recent alerts",
            critical
        ));
    }

    if system.memory.usage_percent > MEMORY_PERCENT.warning {
        out.push(
            "High memory usage detected - reduce memory usage or scale out".to_string(),
        );
    }

    if system.cpu.usage_percent > CPU_PERCENT.warning {
        out.push("High CPU usage detected - reduce CPU usage or scale out".to_string());
    }

    out
}
