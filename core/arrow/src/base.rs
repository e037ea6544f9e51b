//! Shared arrow bookkeeping: identity, lifecycle state, the sequential
//! gating counter, and metrics (§3 Arrow).

use crate::kind::ArrowKind;
use crate::kind::ArrowState;
use jana_otel::ArrowMetrics;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Mutex;

/// Common state every concrete arrow kind embeds. Not `pub` outside this
/// crate's arrow implementations — callers interact with arrows through
/// the [`crate::Arrow`] trait.
pub struct ArrowBase {
    name: String,
    kind: ArrowKind,
    is_parallel: bool,
    state: Mutex<ArrowState>,
    active_workers: AtomicUsize,
    metrics: ArrowMetrics,
}

impl ArrowBase {
    pub fn new(name: impl Into<String>, kind: ArrowKind, is_parallel: bool) -> Self {
        Self {
            name: name.into(),
            kind,
            is_parallel,
            state: Mutex::new(ArrowState::Unopened),
            active_workers: AtomicUsize::new(0),
            metrics: ArrowMetrics::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ArrowKind {
        self.kind
    }

    pub fn is_parallel(&self) -> bool {
        self.is_parallel
    }

    pub fn state(&self) -> ArrowState {
        *self.state.lock().expect("arrow state mutex poisoned")
    }

    pub fn set_state(&self, state: ArrowState) {
        *self.state.lock().expect("arrow state mutex poisoned") = state;
    }

    pub fn active_workers(&self) -> usize {
        self.active_workers.load(Ordering::Relaxed)
    }

    /// Attempts to enter an execution step on behalf of one worker.
    /// Parallel arrows always admit; sequential arrows admit only when no
    /// other worker currently holds them (§3 invariant, §4.5 policy 4).
    pub fn try_enter(&self) -> bool {
        if self.is_parallel {
            self.active_workers.fetch_add(1, Ordering::AcqRel);
            true
        } else {
            self.active_workers
                .compare_exchange(0, 1, Ordering::AcqRel, Ordering::Relaxed)
                .is_ok()
        }
    }

    pub fn exit(&self) {
        self.active_workers.fetch_sub(1, Ordering::AcqRel);
    }

    pub fn metrics(&self) -> &ArrowMetrics {
        &self.metrics
    }
}
