// Background snapshot timer.
// Each tick captures host counters on the blocking pool and hands the result
// to the monitor; shutdown is a oneshot, like the other long-lived tasks.

use std::sync::Weak;

use tokio::sync::oneshot;
use tokio::time::{Duration, Instant, MissedTickBehavior, interval_at};
use tracing::Instrument;

use crate::monitor::PerformanceMonitor;

/// Owned by the monitor while monitoring is active.
pub struct TimerHandle {
    shutdown_tx: oneshot::Sender<()>,
    join: tokio::task::JoinHandle<()>,
}

impl TimerHandle {
    /// Signals the loop and aborts it, so no pending tick is awaited.
    pub fn stop(self) {
        let _ = self.shutdown_tx.send(());
        self.join.abort();
    }
}

/// Spawns the tick loop on `runtime`. The first tick fires one `period`
/// after start. The loop holds only a weak reference and exits once the
/// monitor is dropped.
pub fn spawn(
    runtime: &tokio::runtime::Handle,
    monitor: Weak<PerformanceMonitor>,
    generation: u64,
    period: Duration,
) -> TimerHandle {
    let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
    let span = tracing::span!(
        tracing::Level::DEBUG,
        "snapshot_timer",
        period_ms = period.as_millis() as u64,
        generation
    );
    let task = async move {
        let mut tick = interval_at(Instant::now() + period, period);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    let Some(monitor) = monitor.upgrade() else {
                        tracing::debug!("Monitor dropped; snapshot timer exiting");
                        break;
                    };
                    let result = tokio::task::spawn_blocking(move || monitor.collect_tick(generation)).await;
                    match result {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => {
                            tracing::error!(
                                error = %e,
                                operation = "collect_system_metrics",
                                "system metrics collection failed"
                            );
                        }
                        Err(e) => {
                            tracing::error!(
                                error = %e,
                                operation = "collect_system_metrics",
                                "snapshot task join failed"
                            );
                        }
                    }
                }
                _ = &mut shutdown_rx => {
                    tracing::debug!("Snapshot timer shutting down");
                    break;
                }
            }
        }
    };
    let join = runtime.spawn(task.instrument(span));
    TimerHandle { shutdown_tx, join }
}
