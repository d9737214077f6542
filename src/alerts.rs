// Fixed threshold rules. Each evaluation is independent; the only state is
// what the caller passes in.

use uuid::Uuid;

use crate::models::{
    Alert, AlertKind, AlertSeverity, EndpointStats, PerformanceSample, SystemSnapshot,
};

/// Warning (HIGH) and critical limits for one signal. Both are exclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Threshold {
    pub warning: f64,
    pub critical: f64,
}

impl Threshold {
    /// The crossed limit, critical first. `NaN` crosses nothing.
    pub fn crossed(&self, value: f64) -> Option<(AlertSeverity, f64)> {
        if value > self.critical {
            Some((AlertSeverity::Critical, self.critical))
        } else if value > self.warning {
            Some((AlertSeverity::High, self.warning))
        } else {
            None
        }
    }
}

pub const RESPONSE_TIME_MS: Threshold = Threshold {
    warning: 1000.0,
    critical: 5000.0,
};
pub const ERROR_RATE_PERCENT: Threshold = Threshold {
    warning: 5.0,
    critical: 10.0,
};
pub const MEMORY_PERCENT: Threshold = Threshold {
    warning: 80.0,
    critical: 90.0,
};
pub const CPU_PERCENT: Threshold = Threshold {
    warning: 70.0,
    critical: 80.0,
};

/// Error rates are not judged before an endpoint has this many samples.
pub const ERROR_RATE_MIN_SAMPLES: u64 = 10;

/// An alert before it gets an id and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertDraft {
    pub severity: AlertSeverity,
    pub kind: AlertKind,
    pub message: String,
    pub endpoint_key: Option<String>,
    pub value: f64,
    pub threshold: f64,
}

impl AlertDraft {
    pub fn into_alert(self, timestamp: u64) -> Alert {
        Alert {
            id: Uuid::new_v4(),
            severity: self.severity,
            kind: self.kind,
            message: self.message,
            endpoint_key: self.endpoint_key,
            value: self.value,
            threshold: self.threshold,
            timestamp,
        }
    }
}

/// Response-time and error-rate checks for a freshly recorded sample.
/// `stats` are the endpoint's stats including that sample.
pub fn evaluate_request(
    sample: &PerformanceSample,
    stats: Option<&EndpointStats>,
) -> Vec<AlertDraft> {
    let mut drafts = Vec::new();

    let rt = sample.response_time_ms as f64;
    if let Some((severity, threshold)) = RESPONSE_TIME_MS.crossed(rt) {
        let label = match severity {
            AlertSeverity::Critical => "Critical response time",
            AlertSeverity::High => "Slow response time",
        };
        drafts.push(AlertDraft {
            severity,
            kind: AlertKind::ResponseTime,
            message: format!(
                "{}: {}ms for {}",
                label, sample.response_time_ms, sample.endpoint_key
            ),
            endpoint_key: Some(sample.endpoint_key.clone()),
            value: rt,
            threshold,
        });
    }

    if let Some(stats) = stats.filter(|s| s.total_requests >= ERROR_RATE_MIN_SAMPLES)
        && let Some((severity, threshold)) = ERROR_RATE_PERCENT.crossed(stats.error_rate)
    {
        let label = match severity {
            AlertSeverity::Critical => "Critical error rate",
            AlertSeverity::High => "High error rate",
        };
        drafts.push(AlertDraft {
            severity,
            kind: AlertKind::ErrorRate,
            message: format!("{}: {:.1}% for {}", label, stats.error_rate, stats.endpoint_key),
            endpoint_key: Some(stats.endpoint_key.clone()),
            value: stats.error_rate,
            threshold,
        });
    }

    drafts
}

/// Memory then CPU checks for a system snapshot.
pub fn evaluate_system(snapshot: &SystemSnapshot) -> Vec<AlertDraft> {
    let checks = [
        (
            AlertKind::Memory,
            MEMORY_PERCENT,
            snapshot.memory.usage_percent,
            "memory",
        ),
        (
            AlertKind::Cpu,
            CPU_PERCENT,
            snapshot.cpu.usage_percent,
            "CPU",
        ),
    ];
    checks
        .into_iter()
        .filter_map(|(kind, limits, value, what)| {
            let (severity, threshold) = limits.crossed(value)?;
            let label = match severity {
                AlertSeverity::Critical => "Critical",
                AlertSeverity::High => "High",
            };
            Some(AlertDraft {
                severity,
                kind,
                message: format!("{} {} usage: {:.1}%", label, what, value),
                endpoint_key: None,
                value,
                threshold,
            })
        })
        .collect()
}
