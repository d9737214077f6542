// Shared test helpers

#![allow(dead_code)]

use perfwatch::MonitorError;
use perfwatch::PerformanceMonitor;
use perfwatch::config::MonitorConfig;
use perfwatch::sysinfo_repo::{HostCounters, HostReading, ProcessReading};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const GB: u64 = 1024 * 1024 * 1024;

/// Host counters with settable values; `fail` makes every host read error.
pub struct FakeHost {
    pub reading: Mutex<HostReading>,
    pub fail: Mutex<bool>,
}

impl FakeHost {
    pub fn new(memory_percent: f64, cpu_percent: f64) -> Arc<Self> {
        Arc::new(Self {
            reading: Mutex::new(reading(memory_percent, cpu_percent)),
            fail: Mutex::new(false),
        })
    }

    pub fn idle() -> Arc<Self> {
        Self::new(40.0, 5.0)
    }

    pub fn set(&self, memory_percent: f64, cpu_percent: f64) {
        *self.reading.lock().unwrap() = reading(memory_percent, cpu_percent);
    }

    pub fn set_reading(&self, r: HostReading) {
        *self.reading.lock().unwrap() = r;
    }

    pub fn set_failing(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }
}

/// 10 GB host with the given memory usage and process CPU usage.
pub fn reading(memory_percent: f64, cpu_percent: f64) -> HostReading {
    let total = 10 * GB;
    let used = (total as f64 * memory_percent / 100.0) as u64;
    HostReading {
        total_memory_bytes: total,
        free_memory_bytes: total - used,
        load_average: [0.5, 0.4, 0.3],
        process_cpu_percent: cpu_percent,
        process_resident_bytes: 256 * 1024 * 1024,
    }
}

impl HostCounters for FakeHost {
    fn read_host(&self) -> Result<HostReading, MonitorError> {
        if *self.fail.lock().unwrap() {
            return Err(MonitorError::HostCounters("counters unavailable".into()));
        }
        Ok(self.reading.lock().unwrap().clone())
    }

    fn read_process(&self) -> Result<ProcessReading, MonitorError> {
        Ok(ProcessReading::default())
    }
}

pub fn monitor_with(host: Arc<FakeHost>) -> Arc<PerformanceMonitor> {
    Arc::new(PerformanceMonitor::with_host_counters(
        MonitorConfig::default(),
        host,
    ))
}

pub fn monitor() -> Arc<PerformanceMonitor> {
    monitor_with(FakeHost::idle())
}

pub fn fast_monitor(host: Arc<FakeHost>, interval_ms: u64) -> Arc<PerformanceMonitor> {
    Arc::new(PerformanceMonitor::with_host_counters(
        MonitorConfig {
            sample_interval: Duration::from_millis(interval_ms),
        },
        host,
    ))
}
