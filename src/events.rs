// Observer list for monitor events.
// Dispatch is synchronous and follows subscription order. A subscriber that
// fails or panics is logged and skipped; it never interrupts ingestion.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, RwLock};

use crate::models::{Alert, PerformanceSample, SystemSnapshot};

#[derive(Debug, Clone)]
pub enum MonitorEvent {
    MonitoringStarted,
    MonitoringStopped,
    RequestRecorded(PerformanceSample),
    SystemMetricsCollected(SystemSnapshot),
    AlertCreated(Alert),
    MetricsReset,
}

impl MonitorEvent {
    pub fn name(&self) -> &'static str {
        match self {
            MonitorEvent::MonitoringStarted => "monitoring-started",
            MonitorEvent::MonitoringStopped => "monitoring-stopped",
            MonitorEvent::RequestRecorded(_) => "request-recorded",
            MonitorEvent::SystemMetricsCollected(_) => "system-metrics-collected",
            MonitorEvent::AlertCreated(_) => "alert-created",
            MonitorEvent::MetricsReset => "metrics-reset",
        }
    }
}

pub type Subscriber = Arc<dyn Fn(&MonitorEvent) -> anyhow::Result<()> + Send + Sync>;

#[derive(Default)]
pub struct EventBus {
    subscribers: RwLock<Vec<Subscriber>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, f: F)
    where
        F: Fn(&MonitorEvent) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let mut subs = self
            .subscribers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        subs.push(Arc::new(f));
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .read()
            .map(|s| s.len())
            .unwrap_or_else(|poisoned| poisoned.into_inner().len())
    }

    /// Calls every subscriber with `event`. The list is cloned first, so a
    /// subscriber may subscribe further observers without deadlocking.
    pub fn emit(&self, event: &MonitorEvent) {
        let subs: Vec<Subscriber> = self
            .subscribers
            .read()
            .map(|s| s.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone());
        for (index, sub) in subs.iter().enumerate() {
            match panic::catch_unwind(AssertUnwindSafe(|| sub(event))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::warn!(
                        error = %e,
                        event = event.name(),
                        subscriber = index,
                        "event subscriber failed"
                    );
                }
                Err(_) => {
                    tracing::warn!(
                        event = event.name(),
                        subscriber = index,
                        "event subscriber panicked"
                    );
                }
            }
        }
    }
}
