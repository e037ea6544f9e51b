//! [`MapArrow`]: runs factory/user stage code on each event, in parallel
//! across workers (§4.4.2).

use crate::base::ArrowBase;
use crate::error::ArrowError;
use crate::kind::ArrowKind;
use crate::kind::ArrowState;
use crate::kind::StepOutcome;
use jana_event::Event;
use jana_event::EventFailure;
use jana_queue::PushError;
use jana_queue::Queue;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Instant;

/// The per-event body a `MapArrow` runs. Typically this triggers one or
/// more factories via `event.factory_set()`, forcing auto-activated
/// factories to run even with no declared Tap-side consumer (§6
/// `--auto_activate`), but it may be arbitrary user code.
pub trait MapStage: Send + Sync {
    fn name(&self) -> &str;
    fn run(&self, event: &Event) -> Result<(), ArrowError>;
}

/// Parallel processing stage between a source and a tap. Unlike
/// `SourceArrow`/`TapArrow`, a failure here never aborts the arrow — the
/// event is annotated and forwarded so a downstream `TapArrow` can decide
/// what to do with it (§4.4.2, §7 propagation policy).
pub struct MapArrow {
    base: ArrowBase,
    input: Arc<Queue<Arc<Event>>>,
    output: Arc<Queue<Arc<Event>>>,
    stage: Box<dyn MapStage>,
    chunksize: usize,
    pending: Mutex<VecDeque<Arc<Event>>>,
}

impl MapArrow {
    pub fn new(
        name: impl Into<String>,
        input: Arc<Queue<Arc<Event>>>,
        output: Arc<Queue<Arc<Event>>>,
        stage: Box<dyn MapStage>,
        chunksize: usize,
    ) -> Self {
        Self {
            base: ArrowBase::new(name, ArrowKind::Map, true),
            input,
            output,
            stage,
            chunksize: chunksize.max(1),
            pending: Mutex::new(VecDeque::new()),
        }
    }

    pub fn base(&self) -> &ArrowBase {
        &self.base
    }

    pub fn open(&self) {
        self.base.set_state(ArrowState::Running);
    }

    pub fn execute(&self) -> Result<StepOutcome, ArrowError> {
        let started = Instant::now();
        let mut completed = 0u64;

        {
            let mut pending = self.pending.lock().expect("pending mutex poisoned");
            while let Some(event) = pending.pop_front() {
                match self.output.push(event) {
                    Ok(()) => completed += 1,
                    Err(PushError(event)) => {
                        pending.push_front(event);
                        break;
                    }
                }
            }
            if !pending.is_empty() {
                self.record(completed, started);
                return Ok(if completed > 0 {
                    StepOutcome::KeepGoing
                } else {
                    StepOutcome::ComeBackLater
                });
            }
        }

        let mut processed_any = false;
        for _ in 0..self.chunksize {
            let Some(event) = self.input.pop() else {
                break;
            };
            processed_any = true;
            if let Err(err) = self.stage.run(&event) {
                tracing::warn!(
                    arrow = self.base.name(),
                    stage = self.stage.name(),
                    error = %err,
                    "map stage raised; forwarding failed event"
                );
                event.mark_failed(EventFailure::new(self.stage.name(), err.to_string()));
            }
            match self.output.push(event) {
                Ok(()) => completed += 1,
                Err(PushError(event)) => {
                    self.pending.lock().expect("pending mutex poisoned").push_back(event);
                }
            }
        }

        self.record(completed, started);
        if processed_any {
            Ok(StepOutcome::KeepGoing)
        } else {
            Ok(StepOutcome::ComeBackLater)
        }
    }

    fn record(&self, completed: u64, started: Instant) {
        let elapsed = started.elapsed();
        self.base.metrics().record_step(completed, elapsed, elapsed, std::time::Duration::ZERO);
    }
}

#[cfg(test)]
#[path = "map.test.rs"]
mod tests;
