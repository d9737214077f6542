// Threshold alerts

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Serializes to uppercase JSON (e.g. "CRITICAL").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertSeverity {
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertKind {
    ResponseTime,
    ErrorRate,
    Memory,
    Cpu,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: Uuid,
    pub severity: AlertSeverity,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub message: String,
    /// `None` for system-level (memory/CPU) alerts.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub endpoint_key: Option<String>,
    pub value: f64,
    pub threshold: f64,
    pub timestamp: u64,
}
