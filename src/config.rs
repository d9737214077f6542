use serde::Deserialize;
use std::time::Duration;

/// Snapshot interval used when none is configured.
pub const DEFAULT_SAMPLE_INTERVAL_MS: u64 = 5000;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    /// How often the system snapshot timer fires.
    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,
    /// Start the snapshot timer when the server boots.
    #[serde(default = "default_autostart")]
    pub autostart: bool,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: default_sample_interval_ms(),
            autostart: default_autostart(),
        }
    }
}

fn default_sample_interval_ms() -> u64 {
    DEFAULT_SAMPLE_INTERVAL_MS
}

fn default_autostart() -> bool {
    true
}

/// Runtime settings for a `PerformanceMonitor`.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub sample_interval: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            sample_interval: Duration::from_millis(DEFAULT_SAMPLE_INTERVAL_MS),
        }
    }
}

impl From<&MonitoringConfig> for MonitorConfig {
    fn from(c: &MonitoringConfig) -> Self {
        Self {
            sample_interval: Duration::from_millis(c.sample_interval_ms),
        }
    }
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(!self.server.host.is_empty(), "server.host must be non-empty");
        anyhow::ensure!(
            self.monitoring.sample_interval_ms > 0,
            "monitoring.sample_interval_ms must be > 0, got {}",
            self.monitoring.sample_interval_ms
        );
        Ok(())
    }
}
