// In-process API performance telemetry.

pub mod alerts;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod events;
pub mod models;
pub mod monitor;
pub mod routes;
pub mod stats;
pub mod store;
pub mod sysinfo_repo;
pub mod worker;

pub use error::MonitorError;
pub use events::MonitorEvent;
pub use monitor::PerformanceMonitor;
