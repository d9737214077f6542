// Performance monitor: the public face of the aggregator.
//
// All mutable state (sample/alert windows, start time, timer handle) sits
// behind one mutex so every operation is atomic with respect to the others.
// Events are dispatched only after that lock is released, so subscribers may
// call back into the monitor.

use std::cell::Cell;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::alerts;
use crate::config::MonitorConfig;
use crate::dashboard;
use crate::error::{MonitorError, Result};
use crate::events::{EventBus, MonitorEvent};
use crate::models::{
    Alert, CpuUsage, DashboardSnapshot, DatabaseUsage, EndpointStats, ExportBundle, ExportSummary,
    MemoryUsage, NetworkUsage, PerformanceSample, SystemSnapshot, now_ms,
};
use crate::stats;
use crate::store::SampleStore;
use crate::sysinfo_repo::{HostCounters, HostReading, ProcessReading, SysinfoRepo};
use crate::worker::{self, TimerHandle};

/// Default `limit` for `recent_alerts`.
pub const DEFAULT_ALERT_LIMIT: usize = 20;
/// Alerts included in the dashboard view.
pub const DASHBOARD_ALERTS: usize = 10;
/// Samples included in the dashboard timeline.
pub const DASHBOARD_TIMELINE: usize = 100;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

struct MonitorState {
    store: SampleStore,
    start_time: u64,
    timer: Option<TimerHandle>,
    /// Bumped on every start/stop; ticks from an older run are ignored.
    generation: u64,
}

pub struct PerformanceMonitor {
    config: MonitorConfig,
    host: Arc<dyn HostCounters>,
    state: Mutex<MonitorState>,
    /// Held for the whole of a tick so `stop_monitoring` can wait for it.
    tick_gate: Mutex<()>,
    events: EventBus,
}

thread_local! {
    static IN_TICK: Cell<bool> = const { Cell::new(false) };
}

struct InTickGuard;

impl InTickGuard {
    fn enter() -> Self {
        IN_TICK.set(true);
        InTickGuard
    }
}

impl Drop for InTickGuard {
    fn drop(&mut self) {
        IN_TICK.set(false);
    }
}

impl PerformanceMonitor {
    /// Monitor backed by the real host counters.
    pub fn new(config: MonitorConfig) -> Result<Self> {
        let host = Arc::new(SysinfoRepo::new()?);
        Ok(Self::with_host_counters(config, host))
    }

    pub fn with_host_counters(config: MonitorConfig, host: Arc<dyn HostCounters>) -> Self {
        info!(
            sample_interval_ms = config.sample_interval.as_millis() as u64,
            "Performance monitor initialized"
        );
        Self {
            config,
            host,
            state: Mutex::new(MonitorState {
                store: SampleStore::new(),
                start_time: now_ms(),
                timer: None,
                generation: 0,
            }),
            tick_gate: Mutex::new(()),
            events: EventBus::new(),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, MonitorState> {
        // Every mutation leaves the windows consistent, so a poisoned lock is still usable.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn subscribe<F>(&self, f: F)
    where
        F: Fn(&MonitorEvent) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.events.subscribe(f);
    }

    pub fn is_monitoring(&self) -> bool {
        self.lock_state().timer.is_some()
    }

    /// Starts the snapshot timer. A second call while running only logs a warning.
    pub fn start_monitoring(self: &Arc<Self>) -> Result<()> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| MonitorError::NoRuntime)?;
        {
            let mut state = self.lock_state();
            if state.timer.is_some() {
                warn!("Monitoring already started");
                return Ok(());
            }
            state.generation += 1;
            state.start_time = now_ms();
            state.timer = Some(worker::spawn(
                &runtime,
                Arc::downgrade(self),
                state.generation,
                self.config.sample_interval,
            ));
        }
        info!("Performance monitoring started");
        self.events.emit(&MonitorEvent::MonitoringStarted);
        Ok(())
    }

    /// Cancels the snapshot timer. No-op when not running.
    ///
    /// Blocks until a tick already in progress has finished, which includes
    /// its host read. From async code, call it through `spawn_blocking` so a
    /// runtime worker is not held for that wait.
    pub fn stop_monitoring(&self) {
        let timer = {
            let mut state = self.lock_state();
            let Some(timer) = state.timer.take() else {
                return;
            };
            state.generation += 1;
            timer
        };
        timer.stop();
        // Wait out a tick already past its generation check, unless this is
        // a subscriber stopping from inside that tick.
        if !IN_TICK.get() {
            drop(self.tick_gate.lock().unwrap_or_else(PoisonError::into_inner));
        }
        info!("Performance monitoring stopped");
        self.events.emit(&MonitorEvent::MonitoringStopped);
    }

    /// Records one completed request without database connection info.
    pub fn record_request(&self, path: &str, method: &str, response_time_ms: u64, status_code: u16) {
        self.record_request_with_db(path, method, response_time_ms, status_code, 0);
    }

    pub fn record_request_with_db(
        &self,
        path: &str,
        method: &str,
        response_time_ms: u64,
        status_code: u16,
        db_connections: u32,
    ) {
        let process = self.host.read_process().unwrap_or_else(|e| {
            debug!(error = %e, operation = "read_process", "process counters unavailable");
            ProcessReading::default()
        });
        let now = now_ms();
        let sample = PerformanceSample::new(
            path,
            method,
            response_time_ms,
            status_code,
            db_connections,
            process.memory,
            process.cpu,
            now,
        );

        let created = {
            let mut state = self.lock_state();
            state.store.append(sample.clone());
            let endpoint = stats::stats_for(state.store.samples(), &sample.endpoint_key, now);
            let created: Vec<Alert> = alerts::evaluate_request(&sample, endpoint.as_ref())
                .into_iter()
                .map(|draft| draft.into_alert(now))
                .collect();
            for alert in &created {
                state.store.append_alert(alert.clone());
            }
            created
        };

        debug!(
            endpoint = %sample.endpoint_key,
            response_time_ms,
            status_code,
            "request recorded"
        );
        self.publish_alerts(created);
        self.events.emit(&MonitorEvent::RequestRecorded(sample));
    }

    /// Reads host counters now. Failures are returned, never replaced by a fake snapshot.
    pub fn capture_snapshot(&self) -> Result<SystemSnapshot> {
        let reading = self.host.read_host()?;
        let now = now_ms();
        let requests_per_second = {
            let state = self.lock_state();
            stats::requests_per_second(state.store.samples(), now)
        };
        Ok(build_snapshot(&reading, requests_per_second, now))
    }

    /// One timer tick: snapshot, system thresholds, `system-metrics-collected`.
    pub(crate) fn collect_tick(&self, generation: u64) -> Result<()> {
        let _gate = self.tick_gate.lock().unwrap_or_else(PoisonError::into_inner);
        let _in_tick = InTickGuard::enter();

        let snapshot = self.capture_snapshot()?;
        let created = {
            let mut state = self.lock_state();
            if state.generation != generation || state.timer.is_none() {
                return Ok(());
            }
            let created: Vec<Alert> = alerts::evaluate_system(&snapshot)
                .into_iter()
                .map(|draft| draft.into_alert(snapshot.timestamp))
                .collect();
            for alert in &created {
                state.store.append_alert(alert.clone());
            }
            created
        };
        self.publish_alerts(created);
        self.events.emit(&MonitorEvent::SystemMetricsCollected(snapshot));
        Ok(())
    }

    fn publish_alerts(&self, created: Vec<Alert>) {
        for alert in created {
            warn!(
                severity = ?alert.severity,
                kind = ?alert.kind,
                value = alert.value,
                threshold = alert.threshold,
                "Performance alert: {}",
                alert.message
            );
            self.events.emit(&MonitorEvent::AlertCreated(alert));
        }
    }

    /// Live system metrics plus views over the retained windows.
    pub fn dashboard_data(&self) -> Result<DashboardSnapshot> {
        let system_metrics = self.capture_snapshot()?;
        let now = now_ms();
        let (endpoint_stats, recent_alerts, performance_timeline) = {
            let state = self.lock_state();
            (
                stats::all_endpoint_stats(state.store.samples(), now),
                state.store.recent_alerts(DASHBOARD_ALERTS),
                state.store.recent_samples(DASHBOARD_TIMELINE),
            )
        };
        let recommendations =
            dashboard::recommendations(&endpoint_stats, &recent_alerts, &system_metrics);
        Ok(DashboardSnapshot {
            system_metrics,
            endpoint_stats,
            recent_alerts,
            performance_timeline,
            recommendations,
        })
    }

    /// `None` when no retained sample has this key.
    pub fn endpoint_stats(&self, endpoint_key: &str) -> Option<EndpointStats> {
        let state = self.lock_state();
        stats::stats_for(state.store.samples(), endpoint_key, now_ms())
    }

    /// Last `limit` alerts, oldest first.
    pub fn recent_alerts(&self, limit: usize) -> Vec<Alert> {
        self.lock_state().store.recent_alerts(limit)
    }

    pub fn export_performance_data(&self) -> ExportBundle {
        let now = now_ms();
        let state = self.lock_state();
        let samples = state.store.samples();
        let (total_requests, average_response_time_ms, error_rate) = stats::summarize(samples);
        ExportBundle {
            metrics: samples.iter().cloned().collect(),
            endpoint_stats: stats::all_endpoint_stats(samples, now),
            alerts: state.store.alerts().iter().cloned().collect(),
            system_info: ExportSummary {
                total_requests,
                average_response_time_ms,
                error_rate,
                uptime_ms: now.saturating_sub(state.start_time),
                start_time: state.start_time,
            },
        }
    }

    /// Drops every sample and alert and restarts the uptime clock.
    pub fn reset_metrics(&self) {
        {
            let mut state = self.lock_state();
            state.store.reset();
            state.start_time = now_ms();
        }
        info!("Performance metrics reset");
        self.events.emit(&MonitorEvent::MetricsReset);
    }
}

impl Drop for PerformanceMonitor {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(timer) = state.timer.take() {
            timer.stop();
        }
    }
}

fn to_mb(bytes: u64) -> u64 {
    (bytes as f64 / BYTES_PER_MB).round() as u64
}

/// Derives percentages from a raw reading. Zero total memory gives a `NaN` usage.
pub fn build_snapshot(reading: &HostReading, requests_per_second: u32, timestamp: u64) -> SystemSnapshot {
    let total = reading.total_memory_bytes;
    let free = reading.free_memory_bytes;
    let used = total.saturating_sub(free);
    SystemSnapshot {
        timestamp,
        cpu: CpuUsage {
            usage_percent: reading.process_cpu_percent,
            load_average: reading.load_average,
        },
        memory: MemoryUsage {
            total_mb: to_mb(total),
            used_mb: to_mb(used),
            free_mb: to_mb(free),
            process_resident_mb: to_mb(reading.process_resident_bytes),
            usage_percent: used as f64 / total as f64 * 100.0,
        },
        network: NetworkUsage {
            active_connections: 0,
            requests_per_second,
        },
        database: DatabaseUsage::default(),
    }
}
