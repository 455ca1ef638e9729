//! Gateway statistics
//!
//! Per-worker counters folded into one mutex-guarded aggregate and
//! reported periodically through `tracing`.

mod counters;

pub use counters::{GlobalStats, StatsReport, WorkerCounters};
