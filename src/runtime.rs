//! Runtime utilities for the binary: shutdown signal and background reporters

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::metrics::GlobalStats;

/// Runtime for the acceptors and the stats reporter
///
/// Connection work happens on the worker threads, each with its own runtime.
pub fn build_main_runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("acceptor")
        .enable_all()
        .build()
}

/// Wait for Ctrl+C or SIGTERM
///
/// A signal source that cannot be installed is logged and never fires.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}

/// Spawn background task logging aggregate connection and transfer rates
pub fn spawn_stats_reporter(stats: GlobalStats, interval_secs: u64) -> JoinHandle<()> {
    tokio::spawn(async move {
        let period = Duration::from_secs(interval_secs.max(1));
        let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            stats.report();
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::WorkerCounters;

    #[tokio::test(start_paused = true)]
    async fn test_reporter_drains_window() {
        let stats = GlobalStats::new();
        let mut local = WorkerCounters {
            offered: 5,
            ..WorkerCounters::default()
        };
        stats.flush(&mut local);

        let reporter = spawn_stats_reporter(stats.clone(), 10);
        tokio::time::sleep(Duration::from_secs(11)).await;
        tokio::task::yield_now().await;

        // The report consumed the window; lifetime totals are kept
        assert!(stats.take_window().counters.is_zero());
        assert_eq!(stats.lifetime().offered, 5);
        reporter.abort();
    }

    #[test]
    fn test_main_runtime_builds() {
        let runtime = build_main_runtime().unwrap();
        assert_eq!(runtime.block_on(async { 7 }), 7);
    }
}
