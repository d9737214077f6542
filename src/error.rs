// Error taxonomy for the aggregator.
// Only host/process counter failures and runtime misuse are errors; lookup
// misses are `None` and degenerate percentages are `NaN`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonitorError {
    /// Reading OS or process counters failed (lock poisoned, pid lookup, ...).
    #[error("host counters: {0}")]
    HostCounters(String),

    /// The current process is missing from the process table.
    #[error("current process not found in process table")]
    ProcessNotFound,

    /// `start_monitoring` was called outside a tokio runtime.
    #[error("monitoring requires a tokio runtime")]
    NoRuntime,

    /// A blocking counter read panicked or was cancelled.
    #[error("counter task join: {0}")]
    Join(String),
}

pub type Result<T> = std::result::Result<T, MonitorError>;
