use anyhow::Result;
use perfwatch::*;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;
    let monitor = Arc::new(
        PerformanceMonitor::new(config::MonitorConfig::from(&app_config.monitoring))
            .map_err(|e| anyhow::anyhow!("performance monitor: {}", e))?,
    );

    monitor.subscribe(|event| {
        if let MonitorEvent::SystemMetricsCollected(snapshot) = event {
            tracing::debug!(
                cpu_percent = snapshot.cpu.usage_percent,
                memory_percent = snapshot.memory.usage_percent,
                requests_per_second = snapshot.network.requests_per_second,
                "system metrics collected"
            );
        }
        Ok(())
    });

    if app_config.monitoring.autostart {
        monitor.start_monitoring()?;
    }

    let app = routes::app(monitor.clone());
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    let shutdown = async {
        #[cfg(unix)]
        {
            let mut sigterm = match tokio::signal::unix::signal(
                tokio::signal::unix::SignalKind::terminate(),
            ) {
                Ok(s) => s,
                Err(_) => {
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = sigterm.recv() => {}
            }
        }
        #[cfg(not(unix))]
        {
            let _ = tokio::signal::ctrl_c().await;
        }
        tracing::info!("Received shutdown signal");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    let stopping = monitor.clone();
    tokio::task::spawn_blocking(move || stopping.stop_monitoring()).await?;

    Ok(())
}
