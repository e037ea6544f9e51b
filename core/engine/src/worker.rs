//! [`Worker`]: the thread loop every worker runs (§4.6).
//!
//! ```text
//! loop:
//!   (arrow, backoff) = scheduler.next_assignment(id)
//!   if arrow is None: sleep(backoff); continue
//!   status, metrics = arrow.execute(location=id)
//!   scheduler.checkin(id, arrow, status, metrics)
//!   if engine.should_stop: break
//! ```
//!
//! Metrics are recorded by the arrow itself (`ArrowBase::metrics`); this
//! module only adds the bookkeeping the engine's timeout watchdog and
//! status report need: which arrow a worker is currently inside, and since
//! when.

use jana_arrow::StepOutcome;
use jana_scheduler::Assignment;
use jana_scheduler::Scheduler;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Instant;

/// What a worker is doing right now, as seen from outside its thread —
/// consulted by the timeout watchdog and the status-pipe report (§4.6,
/// §6).
#[derive(Default)]
pub struct WorkerStatus {
    inner: Mutex<Option<(String, Instant)>>,
}

impl WorkerStatus {
    pub fn new() -> Self {
        Self::default()
    }

    fn begin(&self, arrow: &str) {
        *self.inner.lock().expect("worker status mutex poisoned") = Some((arrow.to_string(), Instant::now()));
    }

    fn end(&self) {
        *self.inner.lock().expect("worker status mutex poisoned") = None;
    }

    /// The arrow this worker is currently executing, and how long it's
    /// been inside that one `execute` call — `None` if it's idle.
    pub fn current(&self) -> Option<(String, std::time::Duration)> {
        self.inner
            .lock()
            .expect("worker status mutex poisoned")
            .as_ref()
            .map(|(name, started)| (name.clone(), started.elapsed()))
    }
}

/// Runs one worker's loop until `should_stop` is set or `paused` holds it
/// idle. Returns the first `ArrowError` this worker observed, if any —
/// the engine treats that as fatal and begins shutting the whole topology
/// down (§7 propagation policy: a `Source`/`Multilevel` arrow's `execute`
/// is the only one that ever returns `Err` up through here; `Map`/`Tap`
/// arrows annotate the offending event and keep going).
pub fn run(
    worker_id: usize,
    scheduler: Arc<Scheduler>,
    status: Arc<WorkerStatus>,
    should_stop: Arc<AtomicBool>,
    paused: Arc<AtomicBool>,
) -> Option<jana_arrow::ArrowError> {
    loop {
        if should_stop.load(Ordering::Acquire) {
            return None;
        }
        if paused.load(Ordering::Acquire) {
            std::thread::sleep(std::time::Duration::from_millis(5));
            continue;
        }

        match scheduler.next_assignment(worker_id) {
            Assignment::Idle { hint } => {
                std::thread::sleep(hint.0);
            }
            Assignment::Run { index, arrow } => {
                status.begin(arrow.name());
                let outcome = arrow.execute();
                status.end();
                match outcome {
                    Ok(step_outcome) => {
                        scheduler.checkin(worker_id, index, step_outcome);
                        if step_outcome == StepOutcome::Finished {
                            tracing::debug!(worker_id, arrow = arrow.name(), "arrow finished");
                        }
                    }
                    Err(err) => {
                        scheduler.checkin(worker_id, index, StepOutcome::ComeBackLater);
                        tracing::error!(worker_id, arrow = arrow.name(), error = %err, "arrow raised; stopping");
                        return Some(err);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "worker.test.rs"]
mod tests;
