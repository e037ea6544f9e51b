//! [`EngineConfig`]: the run-time knobs `Engine::new` is built from (§4.6,
//! §6 CLI surface, §4.7 ordering discipline).
//!
//! `jana-cli` is the usual source of these values (parsed from
//! [`jana_config::CliArgs`]); nothing here depends on `jana-config` itself,
//! so an embedding application can build one without going through a CLI
//! at all.

use std::path::PathBuf;
use std::time::Duration;

/// Construction-time parameters for an [`crate::Engine`].
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Initial worker thread count (§6 `--nthreads`).
    pub nthreads: usize,
    /// Maximum events to emit, per source (§6 `--nevents`).
    pub nevents: Option<u64>,
    /// Events a single arrow step processes before yielding back to the
    /// scheduler (§4.4.2 `chunksize`).
    pub chunksize: usize,
    /// Events held in each level's [`jana_pool::EventPool`] at once.
    pub pool_capacity: usize,
    /// Capacity of the `source_to_map` and `map_to_tap` queues. Independent
    /// of `pool_capacity` — §8's boundary scenario ("queue capacity = 1,
    /// pool capacity = max_inflight") needs the two to vary separately.
    pub queue_capacity: usize,
    /// Per-event deadline checked by the timeout watchdog (§4.6). `None`
    /// disables the watchdog entirely.
    pub per_event_timeout: Option<Duration>,
    /// Resolved `--auto_activate=type[:label]` requests, already split
    /// into `(type_name, label)` pairs.
    pub auto_activate: Vec<(String, String)>,
    /// Path for the status FIFO (§6 "Status pipe"). `None` disables it.
    pub status_pipe_path: Option<PathBuf>,
    /// How often the monitor thread polls for timeouts/signals/status
    /// requests. Not part of the spec surface; small enough that a
    /// `per_event_timeout` is detected promptly without busy-spinning.
    pub monitor_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            nthreads: 1,
            nevents: None,
            chunksize: 8,
            pool_capacity: 16,
            queue_capacity: 16,
            per_event_timeout: Some(Duration::from_secs(8)),
            auto_activate: Vec::new(),
            status_pipe_path: None,
            monitor_interval: Duration::from_millis(50),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_spec_timeout_example() {
        let config = EngineConfig::default();
        assert_eq!(config.per_event_timeout, Some(Duration::from_secs(8)));
        assert_eq!(config.nthreads, 1);
    }
}
