//! Transfer and connection counters
//!
//! Workers count into a plain local [`WorkerCounters`] and fold it into the
//! shared [`GlobalStats`] every 100ms, so the hot path never touches a lock.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tracing::info;

/// Counts since a worker's last flush
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerCounters {
    /// CHECK and IHAVE offers
    pub offered: u64,
    /// Completed TAKETHIS and IHAVE transfers
    pub accepted: u64,
    pub opened: u64,
    pub closed: u64,
}

impl WorkerCounters {
    #[inline]
    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    fn add(&mut self, other: &Self) {
        self.offered += other.offered;
        self.accepted += other.accepted;
        self.opened += other.opened;
        self.closed += other.closed;
    }
}

/// Totals gathered from every worker
#[derive(Debug)]
struct Totals {
    /// Accumulated since the last report
    window: WorkerCounters,
    /// Accumulated since startup
    lifetime: WorkerCounters,
    window_start: Instant,
}

/// Aggregated counters shared by all workers and the reporter
#[derive(Debug, Clone)]
pub struct GlobalStats {
    inner: Arc<Mutex<Totals>>,
}

/// Rates over one report window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatsReport {
    pub counters: WorkerCounters,
    pub elapsed: Duration,
}

impl StatsReport {
    /// Events per second, zero for an empty window
    #[must_use]
    pub fn per_sec(&self, count: u64) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 { count as f64 / secs } else { 0.0 }
    }
}

impl GlobalStats {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Totals {
                window: WorkerCounters::default(),
                lifetime: WorkerCounters::default(),
                window_start: Instant::now(),
            })),
        }
    }

    /// Fold a worker's counters in and reset them
    pub fn flush(&self, local: &mut WorkerCounters) {
        if local.is_zero() {
            return;
        }
        let mut totals = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        totals.window.add(local);
        totals.lifetime.add(local);
        *local = WorkerCounters::default();
    }

    /// Counters since startup
    #[must_use]
    pub fn lifetime(&self) -> WorkerCounters {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .lifetime
    }

    /// Close the current window and return what it saw
    pub fn take_window(&self) -> StatsReport {
        let mut totals = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();
        let report = StatsReport {
            counters: totals.window,
            elapsed: now.duration_since(totals.window_start),
        };
        totals.window = WorkerCounters::default();
        totals.window_start = now;
        report
    }

    /// Log the current window if anything happened in it
    pub fn report(&self) {
        let report = self.take_window();
        let c = report.counters;
        if c.is_zero() {
            return;
        }
        info!(
            offered = c.offered,
            accepted = c.accepted,
            opened = c.opened,
            closed = c.closed,
            "Stats: offered {:.1}/s, accepted {:.1}/s, {} connections opened, {} closed over {:.0}s",
            report.per_sec(c.offered),
            report.per_sec(c.accepted),
            c.opened,
            c.closed,
            report.elapsed.as_secs_f64()
        );
    }
}

impl Default for GlobalStats {
    fn default() -> Self {
        Self::new()
    }
}
