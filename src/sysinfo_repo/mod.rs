// Host and process counters via sysinfo

use std::sync::Mutex;
use std::time::Instant;

use sysinfo::{Pid, ProcessesToUpdate, System};
use tracing::instrument;

use crate::error::{MonitorError, Result};
use crate::models::{ProcessCpu, ProcessMemory};

/// Raw host reading used to build a `SystemSnapshot`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostReading {
    pub total_memory_bytes: u64,
    pub free_memory_bytes: u64,
    pub load_average: [f64; 3],
    /// Process CPU usage since the previous CPU refresh, 0..=100.
    pub process_cpu_percent: f64,
    pub process_resident_bytes: u64,
}

/// Per-request process counters.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProcessReading {
    pub memory: ProcessMemory,
    pub cpu: ProcessCpu,
}

/// Source of OS/process counters. Reads are synchronous and expected to be fast.
pub trait HostCounters: Send + Sync {
    fn read_host(&self) -> Result<HostReading>;
    fn read_process(&self) -> Result<ProcessReading>;
}

/// Snapshot-side `System` plus the last process CPU figure taken from it.
struct HostSys {
    sys: System,
    last_cpu_refresh: Option<(Instant, f64)>,
}

pub struct SysinfoRepo {
    pid: Pid,
    logical_cores: usize,
    /// Process CPU usage is the delta between refreshes of this `System`.
    host: Mutex<HostSys>,
    /// Refreshed per recorded request; kept apart so it doesn't reset the tick baseline.
    sample_sys: Mutex<System>,
}

impl SysinfoRepo {
    pub fn new() -> Result<Self> {
        let pid = sysinfo::get_current_pid()
            .map_err(|e| MonitorError::HostCounters(format!("current pid: {}", e)))?;
        let mut sys = System::new_all();
        sys.refresh_all();
        let logical_cores = sys.cpus().len().max(1);
        let mut sample_sys = System::new();
        sample_sys.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
        Ok(Self {
            pid,
            logical_cores,
            host: Mutex::new(HostSys {
                sys,
                last_cpu_refresh: None,
            }),
            sample_sys: Mutex::new(sample_sys),
        })
    }
}

impl HostCounters for SysinfoRepo {
    #[instrument(skip(self), fields(repo = "sysinfo", operation = "read_host"))]
    fn read_host(&self) -> Result<HostReading> {
        let mut guard = self
            .host
            .lock()
            .map_err(|e| MonitorError::HostCounters(format!("sysinfo lock poisoned: {}", e)))?;
        let host = &mut *guard;
        host.sys.refresh_memory();

        // Reads closer together than sysinfo's minimum interval reuse the last
        // figure; refreshing again would measure a near-empty window.
        let now = Instant::now();
        let last = host.last_cpu_refresh;
        let cpu = match last {
            Some((at, usage)) if now.duration_since(at) < sysinfo::MINIMUM_CPU_UPDATE_INTERVAL => {
                usage
            }
            _ => {
                host.sys
                    .refresh_processes(ProcessesToUpdate::Some(&[self.pid]), true);
                let process = host
                    .sys
                    .process(self.pid)
                    .ok_or(MonitorError::ProcessNotFound)?;
                let usage =
                    (process.cpu_usage() as f64 / self.logical_cores as f64).clamp(0.0, 100.0);
                host.last_cpu_refresh = Some((now, usage));
                usage
            }
        };
        let process = host
            .sys
            .process(self.pid)
            .ok_or(MonitorError::ProcessNotFound)?;
        let load = System::load_average();

        Ok(HostReading {
            total_memory_bytes: host.sys.total_memory(),
            free_memory_bytes: host.sys.free_memory(),
            load_average: [load.one, load.five, load.fifteen],
            process_cpu_percent: cpu,
            process_resident_bytes: process.memory(),
        })
    }

    fn read_process(&self) -> Result<ProcessReading> {
        let mut sys = self
            .sample_sys
            .lock()
            .map_err(|e| MonitorError::HostCounters(format!("sysinfo lock poisoned: {}", e)))?;
        sys.refresh_processes(ProcessesToUpdate::Some(&[self.pid]), false);
        let process = sys.process(self.pid).ok_or(MonitorError::ProcessNotFound)?;
        Ok(ProcessReading {
            memory: ProcessMemory {
                resident_bytes: process.memory(),
                virtual_bytes: process.virtual_memory(),
            },
            cpu: ProcessCpu {
                accumulated_cpu_ms: process.accumulated_cpu_time(),
                run_time_secs: process.run_time(),
            },
        })
    }
}
