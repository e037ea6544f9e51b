//! [`Scheduler`]: picks the next runnable arrow for an idle worker (§4.5).
//!
//! Policy, in order:
//! 1. Prefer the arrow the worker just ran, if it's still `Running` and its
//!    last step wasn't `ComeBackLater` (cache locality).
//! 2. Otherwise round-robin through `Running` arrows from a per-worker
//!    rotating index, breaking ties by fewest visits (fairness).
//! 3. If nothing is assignable, return `Idle` with a backoff hint that
//!    grows with consecutive idle rounds.
//! 4. A sequential arrow is gated by [`jana_arrow::ArrowStep::try_enter`],
//!    which a parallel arrow always grants; this scheduler never needs to
//!    know which kind it's looking at.

use jana_arrow::ArrowState;
use jana_arrow::ArrowStep;
use jana_arrow::StepOutcome;
use jana_arrow::Topology;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

/// How long an idle worker should sleep before calling
/// [`Scheduler::next_assignment`] again ("checkin_time" in §4.5 policy 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffHint(pub Duration);

impl BackoffHint {
    pub const MIN: Duration = Duration::from_micros(50);
    pub const MAX: Duration = Duration::from_millis(10);
}

/// What [`Scheduler::next_assignment`] hands back to an idle worker.
pub enum Assignment {
    /// Run this arrow. Its sequential gate, if any, is already held and
    /// must be released through [`Scheduler::checkin`].
    Run { index: usize, arrow: Arc<dyn ArrowStep> },
    /// Nothing was assignable this round; back off for `hint`.
    Idle { hint: BackoffHint },
}

struct WorkerCursor {
    last_arrow: Option<usize>,
    rotation: usize,
}

/// Drives work assignment over one fixed topology's arrows. Constructed
/// once per [`jana_arrow::Topology`] at `Initialize`; worker slots can grow
/// afterward via [`Scheduler::register_worker`] to support `Scale(n)`
/// without tearing the scheduler down.
pub struct Scheduler {
    arrows: Vec<Arc<dyn ArrowStep>>,
    visit_counts: Vec<AtomicU64>,
    last_outcome: Vec<Mutex<Option<StepOutcome>>>,
    workers: Mutex<Vec<WorkerCursor>>,
    consecutive_idle: AtomicUsize,
}

impl Scheduler {
    pub fn new(topology: &Topology, worker_count: usize) -> Self {
        Self::from_arrows(topology.arrows().to_vec(), worker_count)
    }

    /// Builds a scheduler directly over a list of arrows, bypassing
    /// [`Topology`]'s port-binding validation. Used by tests and by any
    /// caller that has already assembled its arrows through some other
    /// means — the scheduler itself only ever needs the arrow list.
    pub fn from_arrows(arrows: Vec<Arc<dyn ArrowStep>>, worker_count: usize) -> Self {
        let visit_counts = arrows.iter().map(|_| AtomicU64::new(0)).collect();
        let last_outcome = arrows.iter().map(|_| Mutex::new(None)).collect();
        let workers = (0..worker_count)
            .map(|_| WorkerCursor { last_arrow: None, rotation: 0 })
            .collect();
        Self {
            arrows,
            visit_counts,
            last_outcome,
            workers: Mutex::new(workers),
            consecutive_idle: AtomicUsize::new(0),
        }
    }

    pub fn arrow_count(&self) -> usize {
        self.arrows.len()
    }

    pub fn arrows(&self) -> &[Arc<dyn ArrowStep>] {
        &self.arrows
    }

    pub fn worker_count(&self) -> usize {
        self.workers.lock().expect("scheduler workers mutex poisoned").len()
    }

    /// Adds one more worker slot, used by `Engine::scale` to grow the pool
    /// without rebuilding the scheduler or the topology (§4.6 `Scale(n)`).
    pub fn register_worker(&self) -> usize {
        let mut workers = self.workers.lock().expect("scheduler workers mutex poisoned");
        workers.push(WorkerCursor { last_arrow: None, rotation: 0 });
        workers.len() - 1
    }

    pub fn next_assignment(&self, worker_id: usize) -> Assignment {
        if self.arrows.is_empty() {
            return Assignment::Idle { hint: BackoffHint::MAX };
        }

        if let Some(index) = self.preferred_arrow(worker_id) {
            if self.is_runnable(index) && self.last_was_productive(index) {
                if let Some(assignment) = self.try_assign(worker_id, index) {
                    return assignment;
                }
            }
        }

        let start = self.advance_rotation(worker_id);
        let mut candidates: Vec<usize> = (0..self.arrows.len())
            .map(|offset| (start + offset) % self.arrows.len())
            .filter(|&i| self.is_runnable(i))
            .collect();
        candidates.sort_by_key(|&i| self.visit_counts[i].load(Ordering::Relaxed));

        for index in candidates {
            if let Some(assignment) = self.try_assign(worker_id, index) {
                return assignment;
            }
        }

        let streak = self.consecutive_idle.fetch_add(1, Ordering::Relaxed);
        Assignment::Idle { hint: backoff_for(streak) }
    }

    /// Releases the sequential gate acquired by `try_assign` and records
    /// the step's outcome, so the next `next_assignment` call for this
    /// worker can apply policy 1 correctly.
    pub fn checkin(&self, _worker_id: usize, index: usize, outcome: StepOutcome) {
        self.arrows[index].exit();
        *self.last_outcome[index].lock().expect("last-outcome mutex poisoned") = Some(outcome);
        tracing::trace!(arrow = self.arrows[index].name(), ?outcome, "scheduler checkin");
    }

    fn preferred_arrow(&self, worker_id: usize) -> Option<usize> {
        let workers = self.workers.lock().expect("scheduler workers mutex poisoned");
        workers.get(worker_id).and_then(|w| w.last_arrow)
    }

    fn advance_rotation(&self, worker_id: usize) -> usize {
        let mut workers = self.workers.lock().expect("scheduler workers mutex poisoned");
        let cursor = &mut workers[worker_id];
        cursor.rotation = (cursor.rotation + 1) % self.arrows.len();
        cursor.rotation
    }

    fn is_runnable(&self, index: usize) -> bool {
        self.arrows[index].state() == ArrowState::Running
    }

    fn last_was_productive(&self, index: usize) -> bool {
        !matches!(
            *self.last_outcome[index].lock().expect("last-outcome mutex poisoned"),
            Some(StepOutcome::ComeBackLater)
        )
    }

    fn try_assign(&self, worker_id: usize, index: usize) -> Option<Assignment> {
        let arrow = &self.arrows[index];
        if !arrow.try_enter() {
            return None;
        }
        self.visit_counts[index].fetch_add(1, Ordering::Relaxed);
        self.consecutive_idle.store(0, Ordering::Relaxed);
        let mut workers = self.workers.lock().expect("scheduler workers mutex poisoned");
        workers[worker_id].last_arrow = Some(index);
        Some(Assignment::Run { index, arrow: arrow.clone() })
    }
}

fn backoff_for(idle_streak: usize) -> BackoffHint {
    let shift = idle_streak.min(8) as u32;
    let micros = (BackoffHint::MIN.as_micros() as u64).saturating_mul(1u64 << shift);
    BackoffHint(Duration::from_micros(micros).min(BackoffHint::MAX))
}

#[cfg(test)]
#[path = "policy.test.rs"]
mod tests;
