//! The human-readable report written to the status FIFO on receipt of the
//! configured status signal (§6 "Status pipe").
//!
//! The report carries a topology table, per-arrow throughput/latency, per-
//! queue occupancy, and per-worker state including a demangled stack trace
//! where the platform allows (§6). It is serialized with `serde_json` so
//! any reader (a CLI pretty-printer, a monitoring sidecar) can consume it
//! without depending on this crate.

use crate::metrics::ArrowMetricsSnapshot;
use serde::Serialize;

/// One row of the topology table: an arrow's identity, kind, and metrics.
#[derive(Debug, Clone, Serialize)]
pub struct ArrowReport {
    pub name: String,
    pub kind: String,
    pub state: String,
    pub thread_count: usize,
    pub metrics: ArrowMetricsSnapshot,
}

/// Occupancy of a single bounded queue or pool at report time.
#[derive(Debug, Clone, Serialize)]
pub struct QueueReport {
    pub name: String,
    pub size: usize,
    pub capacity: usize,
}

/// One worker thread's state at report time.
#[derive(Debug, Clone, Serialize)]
pub struct WorkerReport {
    pub worker_id: usize,
    pub current_arrow: Option<String>,
    pub current_event_index: Option<u64>,
    /// `None` when [`crate::capture_stack`] could not produce a trace.
    pub stack_trace: Option<String>,
}

/// The full point-in-time snapshot written to the status pipe.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub engine_state: String,
    pub arrows: Vec<ArrowReport>,
    pub queues: Vec<QueueReport>,
    pub workers: Vec<WorkerReport>,
}

impl StatusReport {
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ArrowMetrics;

    #[test]
    fn serializes_to_json() {
        let metrics = ArrowMetrics::new();
        metrics.record_step(
            10,
            std::time::Duration::from_secs(1),
            std::time::Duration::from_millis(10),
            std::time::Duration::from_millis(1),
        );
        let report = StatusReport {
            engine_state: "Running".to_string(),
            arrows: vec![ArrowReport {
                name: "source_1".to_string(),
                kind: "Source".to_string(),
                state: "Running".to_string(),
                thread_count: 1,
                metrics: metrics.snapshot(),
            }],
            queues: vec![QueueReport {
                name: "q_source_to_map".to_string(),
                size: 3,
                capacity: 16,
            }],
            workers: vec![WorkerReport {
                worker_id: 0,
                current_arrow: Some("source_1".to_string()),
                current_event_index: Some(7),
                stack_trace: None,
            }],
        };
        let json = report.to_pretty_json().expect("serializable");
        assert!(json.contains("\"engine_state\": \"Running\""));
        assert!(json.contains("\"worker_id\": 0"));
    }
}
