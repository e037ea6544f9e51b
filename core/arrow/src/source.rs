//! [`SourceArrow`]: emits events into a downstream queue (§4.4.1).
//!
//! A `SourceArrow` owns an ordered list of user [`EventSource`]s and walks
//! through them in order: once one reports [`EmitOutcome::Finished`], the
//! arrow advances to the next configured source, and only transitions to
//! [`ArrowState::Finished`] itself once every configured source is
//! exhausted (or the configured `nevents` limit is reached).

use crate::base::ArrowBase;
use crate::error::ArrowError;
use crate::kind::ArrowKind;
use crate::kind::ArrowState;
use crate::kind::StepOutcome;
use jana_event::Event;
use jana_event::EventLevel;
use jana_pool::EventPool;
use jana_queue::PushError;
use jana_queue::Queue;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Instant;

/// What a user [`EventSource`] reports back for one `emit` call.
#[derive(Debug, Clone, Copy)]
pub enum EmitOutcome {
    /// An event was produced; identity is assigned by the arrow, not the
    /// source — the source only reports the free-form `event_number` and
    /// whether this event is a barrier (§4.7).
    Emitted { event_number: u64, is_barrier: bool },
    /// No event is available *yet*; the caller should back off and retry
    /// (§4.4.1).
    TryAgain,
    /// This source has no more events to emit; the arrow advances to the
    /// next configured source, if any.
    Finished,
}

/// User-supplied event producer. The framework drives identity
/// (`run_number`, `event_index`, `source_id`) and payload delivery is left
/// to the implementor via [`jana_factory::FactorySet::insert`] on the
/// event handed to `emit` — matching the "does not dictate data object
/// structure" non-goal (§1).
pub trait EventSource: Send {
    fn name(&self) -> &str;

    fn level(&self) -> EventLevel {
        EventLevel::None
    }

    fn open(&mut self) -> Result<(), ArrowError> {
        Ok(())
    }

    /// Cheap, side-effect-free readiness check used to gate barrier
    /// emission (§4.7): the framework consults this before committing to
    /// call `emit`, so implementors must not need internal state changes
    /// to answer it.
    fn next_is_barrier(&self) -> bool {
        false
    }

    fn emit(&mut self, event: &Event, run_number: u32) -> Result<EmitOutcome, ArrowError>;

    fn finalize(&mut self) -> Result<(), ArrowError> {
        Ok(())
    }
}

struct SourceList {
    sources: Vec<Box<dyn EventSource>>,
    current: usize,
}

/// Emits events from a chain of [`EventSource`]s into one downstream
/// queue, drawing fresh `Event`s from `pool` (§4.4.1).
pub struct SourceArrow {
    base: ArrowBase,
    source_id: usize,
    run_number: u32,
    sources: Mutex<SourceList>,
    pool: Arc<EventPool>,
    output: Arc<Queue<Arc<Event>>>,
    pending: Mutex<Option<Arc<Event>>>,
    nevents: Option<u64>,
    events_emitted: AtomicU64,
    events_finished: AtomicU64,
    /// Shared with every other source feeding the same output queue —
    /// `event_index` orders that queue, not this one arrow, so the
    /// counter must not be scoped to a single instance.
    next_event_index: Arc<AtomicU64>,
    barrier_outstanding: AtomicBool,
    /// Exposed for the status report and the scheduler's chunking
    /// heuristics; `SourceArrow::execute` itself always processes one
    /// event per call so that `TryAgain`/queue-full rollback stays simple.
    chunksize: AtomicUsize,
}

impl SourceArrow {
    pub fn new(
        name: impl Into<String>,
        source_id: usize,
        run_number: u32,
        sources: Vec<Box<dyn EventSource>>,
        pool: Arc<EventPool>,
        output: Arc<Queue<Arc<Event>>>,
        nevents: Option<u64>,
        chunksize: usize,
        next_event_index: Arc<AtomicU64>,
    ) -> Self {
        Self {
            base: ArrowBase::new(name, ArrowKind::Source, false),
            source_id,
            run_number,
            sources: Mutex::new(SourceList { sources, current: 0 }),
            pool,
            output,
            pending: Mutex::new(None),
            nevents,
            events_emitted: AtomicU64::new(0),
            events_finished: AtomicU64::new(0),
            next_event_index,
            barrier_outstanding: AtomicBool::new(false),
            chunksize: AtomicUsize::new(chunksize.max(1)),
        }
    }

    pub fn source_id(&self) -> usize {
        self.source_id
    }

    pub fn chunksize(&self) -> usize {
        self.chunksize.load(Ordering::Relaxed)
    }

    pub fn events_emitted(&self) -> u64 {
        self.events_emitted.load(Ordering::Relaxed)
    }

    /// Called by whichever arrow releases an event back to its pool, when
    /// that event's `source_id` matches this arrow — advances the barrier
    /// quiescence counter (§4.7).
    pub fn notify_finished(&self) {
        self.events_finished.fetch_add(1, Ordering::AcqRel);
    }

    pub fn opens(&self) -> Result<(), ArrowError> {
        let mut sources = self.sources.lock().expect("source list mutex poisoned");
        if let Some(source) = sources.sources.get_mut(sources.current) {
            source.open()?;
        }
        self.base.set_state(ArrowState::Running);
        Ok(())
    }

    fn is_quiescent(&self) -> bool {
        self.events_emitted.load(Ordering::Acquire) == self.events_finished.load(Ordering::Acquire)
    }

    fn finish(&self) -> StepOutcome {
        self.base.set_state(ArrowState::Finished);
        tracing::info!(arrow = self.base.name(), "source arrow finished");
        StepOutcome::Finished
    }

    pub fn execute(&self) -> Result<StepOutcome, ArrowError> {
        let started = Instant::now();
        let outcome = self.execute_inner()?;
        let completed = u64::from(matches!(outcome, StepOutcome::KeepGoing));
        self.base
            .metrics()
            .record_step(completed, started.elapsed(), started.elapsed(), std::time::Duration::ZERO);
        Ok(outcome)
    }

    fn execute_inner(&self) -> Result<StepOutcome, ArrowError> {
        if self.base.state() == ArrowState::Finished {
            return Ok(StepOutcome::Finished);
        }

        // Flush a previously-emitted event that couldn't be pushed because
        // the output queue was full.
        {
            let mut pending = self.pending.lock().expect("pending mutex poisoned");
            if let Some(event) = pending.take() {
                return match self.output.push(event) {
                    Ok(()) => Ok(StepOutcome::KeepGoing),
                    Err(PushError(event)) => {
                        *pending = Some(event);
                        Ok(StepOutcome::ComeBackLater)
                    }
                };
            }
        }

        if let Some(limit) = self.nevents {
            if self.events_emitted.load(Ordering::Relaxed) >= limit {
                let mut sources = self.sources.lock().expect("source list mutex poisoned");
                for source in sources.sources.iter_mut() {
                    source.finalize()?;
                }
                return Ok(self.finish());
            }
        }

        loop {
            let mut sources = self.sources.lock().expect("source list mutex poisoned");
            let current = sources.current;
            let Some(source) = sources.sources.get_mut(current) else {
                drop(sources);
                return Ok(self.finish());
            };

            let will_be_barrier = source.next_is_barrier();
            if (will_be_barrier || self.barrier_outstanding.load(Ordering::Acquire)) && !self.is_quiescent() {
                return Ok(StepOutcome::ComeBackLater);
            }
            // Either no barrier was ever outstanding, or we just proved the
            // previously-emitted one has fully exited the topology.
            self.barrier_outstanding.store(false, Ordering::Release);
            self.output.clear_barrier_pending();

            let Some(event) = self.pool.acquire() else {
                return Ok(StepOutcome::ComeBackLater);
            };

            match source.emit(&event, self.run_number) {
                Ok(EmitOutcome::Emitted { event_number, is_barrier }) => {
                    drop(sources);
                    let event_index = self.next_event_index.fetch_add(1, Ordering::AcqRel);
                    let mut event = event;
                    Arc::get_mut(&mut event)
                        .expect("sole owner immediately after pool acquire")
                        .restamp(self.run_number, event_number, event_index, is_barrier, self.source_id, None);
                    self.events_emitted.fetch_add(1, Ordering::AcqRel);
                    if is_barrier {
                        self.barrier_outstanding.store(true, Ordering::Release);
                        self.output.mark_barrier_pending();
                    }
                    return match self.output.push(event) {
                        Ok(()) => Ok(StepOutcome::KeepGoing),
                        Err(PushError(event)) => {
                            *self.pending.lock().expect("pending mutex poisoned") = Some(event);
                            Ok(StepOutcome::ComeBackLater)
                        }
                    };
                }
                Ok(EmitOutcome::TryAgain) => {
                    drop(sources);
                    self.pool.release(event);
                    return Ok(StepOutcome::ComeBackLater);
                }
                Ok(EmitOutcome::Finished) => {
                    source.finalize()?;
                    sources.current += 1;
                    drop(sources);
                    self.pool.release(event);
                    continue;
                }
                Err(err) => {
                    drop(sources);
                    self.pool.release(event);
                    return Err(err);
                }
            }
        }
    }

    pub fn base(&self) -> &ArrowBase {
        &self.base
    }

    /// Forces `Finalize` on every configured source not yet reached,
    /// starting from whichever one is current, and marks the arrow
    /// `Finished`. Used by `Engine::Stop` to close sources that would
    /// otherwise be left mid-stream when the engine stops before natural
    /// exhaustion (§4.6: "calls Finalize on every source ... in
    /// construction order"). Idempotent with natural completion, since
    /// `finish()` is safe to call more than once.
    pub fn force_finalize(&self) -> Result<(), ArrowError> {
        let mut sources = self.sources.lock().expect("source list mutex poisoned");
        let current = sources.current;
        for source in sources.sources.iter_mut().skip(current) {
            source.finalize()?;
        }
        sources.current = sources.sources.len();
        drop(sources);
        self.finish();
        Ok(())
    }
}

/// Object-safe seam a `TapArrow` uses to report that an event it just
/// released came from this source, without needing to know it's talking
/// to a `SourceArrow` specifically (§4.7 barrier quiescence bookkeeping).
pub trait SourceSink: Send + Sync {
    fn mark_event_finished(&self);
}

impl SourceSink for SourceArrow {
    fn mark_event_finished(&self) {
        self.notify_finished();
    }
}

#[cfg(test)]
#[path = "source.test.rs"]
mod tests;
