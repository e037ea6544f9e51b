//! Logging and status-reporting primitives shared across the engine.
//!
//! This crate owns the *ambient* observability stack — structured logging
//! setup and the in-process metrics/status-report types — but never commits
//! to a concrete reporting backend. Where the event processing core lands
//! metrics (e.g. an OTLP collector, a Prometheus endpoint) is deliberately
//! left to the embedding application, matching the "logging sinks and
//! metrics reporting" non-goal.

mod logging;
mod metrics;
mod stack;
mod status_report;

pub use logging::init_logging;
pub use logging::LogFormat;
pub use metrics::ArrowMetrics;
pub use metrics::ArrowMetricsSnapshot;
pub use stack::capture_stack;
pub use status_report::ArrowReport;
pub use status_report::QueueReport;
pub use status_report::StatusReport;
pub use status_report::WorkerReport;
