//! Per-arrow metrics counters.
//!
//! `arrow.execute` returns `{events completed, wall time, latency, overhead}`
//! after every step (§4.6). Workers update these concurrently from multiple
//! threads, so the counters are plain atomics rather than anything lock-based
//! — metrics bookkeeping must never become a point of contention between
//! workers racing to pull the next arrow.

use serde::Serialize;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

/// Atomic, lock-free accumulator for one arrow's execution metrics.
#[derive(Debug, Default)]
pub struct ArrowMetrics {
    events_completed: AtomicU64,
    total_wall_time_nanos: AtomicU64,
    total_latency_nanos: AtomicU64,
    total_overhead_nanos: AtomicU64,
    steps_run: AtomicU64,
}

impl ArrowMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the outcome of one `execute` step.
    pub fn record_step(
        &self,
        events_completed: u64,
        wall_time: std::time::Duration,
        latency: std::time::Duration,
        overhead: std::time::Duration,
    ) {
        self.events_completed
            .fetch_add(events_completed, Ordering::Relaxed);
        self.total_wall_time_nanos
            .fetch_add(wall_time.as_nanos() as u64, Ordering::Relaxed);
        self.total_latency_nanos
            .fetch_add(latency.as_nanos() as u64, Ordering::Relaxed);
        self.total_overhead_nanos
            .fetch_add(overhead.as_nanos() as u64, Ordering::Relaxed);
        self.steps_run.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ArrowMetricsSnapshot {
        let events_completed = self.events_completed.load(Ordering::Relaxed);
        let total_wall_time_nanos = self.total_wall_time_nanos.load(Ordering::Relaxed);
        let steps_run = self.steps_run.load(Ordering::Relaxed);
        ArrowMetricsSnapshot {
            events_completed,
            steps_run,
            avg_throughput: if total_wall_time_nanos > 0 {
                events_completed as f64 / (total_wall_time_nanos as f64 / 1e9)
            } else {
                0.0
            },
            avg_latency_nanos: checked_avg(self.total_latency_nanos.load(Ordering::Relaxed), steps_run),
            avg_overhead_nanos: checked_avg(
                self.total_overhead_nanos.load(Ordering::Relaxed),
                steps_run,
            ),
        }
    }
}

fn checked_avg(total: u64, count: u64) -> f64 {
    if count == 0 {
        0.0
    } else {
        total as f64 / count as f64
    }
}

/// A point-in-time, `serde`-serializable view of [`ArrowMetrics`], suitable
/// for embedding in a [`crate::StatusReport`].
#[derive(Debug, Clone, Serialize)]
pub struct ArrowMetricsSnapshot {
    pub events_completed: u64,
    pub steps_run: u64,
    pub avg_throughput: f64,
    pub avg_latency_nanos: f64,
    pub avg_overhead_nanos: f64,
}

#[cfg(test)]
#[path = "metrics.test.rs"]
mod tests;
