//! [`MultilevelArrow`]: a source that emits events at more than one
//! declared [`EventLevel`], attaching each finer event to the most
//! recently emitted coarser-level event from the same source (§4.4.4).
//!
//! Unlike [`crate::source::SourceArrow`], which draws every event from one
//! pool and pushes to one queue, this arrow draws from one [`jana_pool::EventPool`]
//! per declared level (via a shared [`PoolRegistry`]) and pushes every
//! level's events into the same downstream queue — a `TapArrow` or
//! `MapArrow` dispatches per event by `event.level()`, not by which queue
//! it arrived on.

use crate::base::ArrowBase;
use crate::error::ArrowError;
use crate::error::MissingPoolSnafu;
use crate::kind::ArrowKind;
use crate::kind::ArrowState;
use crate::kind::StepOutcome;
use crate::source::EmitOutcome;
use crate::source::SourceSink;
use jana_event::Event;
use jana_event::EventLevel;
use jana_pool::PoolRegistry;
use jana_queue::PushError;
use jana_queue::Queue;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Instant;

/// User-supplied producer for a multi-level source. Unlike [`crate::source::EventSource`],
/// the level of the *next* event is itself data the source reports, since one
/// source may interleave levels (e.g. `Run, SlowControls, PhysicsEvent, ...`).
pub trait MultilevelSource: Send {
    fn name(&self) -> &str;

    /// The level the next call to `emit` will produce. Consulted before the
    /// arrow acquires an event, so it must be side-effect-free — mirrors
    /// `EventSource::next_is_barrier`'s readiness-check contract.
    fn next_level(&self) -> EventLevel;

    fn open(&mut self) -> Result<(), ArrowError> {
        Ok(())
    }

    fn next_is_barrier(&self) -> bool {
        false
    }

    fn emit(&mut self, event: &Event, run_number: u32) -> Result<EmitOutcome, ArrowError>;

    fn finalize(&mut self) -> Result<(), ArrowError> {
        Ok(())
    }
}

struct SourceList {
    sources: Vec<Box<dyn MultilevelSource>>,
    current: usize,
}

/// Emits events across several levels from one source chain, wiring up the
/// parent-attachment rule: "for each finer event *c*, its parent at coarser
/// level *L* is the most recently emitted event at level *L* from the same
/// source, if any" (§4.4.4). Parent pointers are assigned once, at
/// emission time, and never change afterward.
pub struct MultilevelArrow {
    base: ArrowBase,
    source_id: usize,
    run_number: u32,
    sources: Mutex<SourceList>,
    pools: Arc<PoolRegistry>,
    output: Arc<Queue<Arc<Event>>>,
    pending: Mutex<Option<Arc<Event>>>,
    /// Most recently emitted event at each level, used as the direct
    /// parent for the next finer-level event (its own ancestor chain
    /// already reaches further up).
    recent: Mutex<BTreeMap<EventLevel, Arc<Event>>>,
    nevents: Option<u64>,
    events_emitted: AtomicU64,
    events_finished: AtomicU64,
    /// Shared with every other source feeding the same output queue, for
    /// the same reason as [`crate::source::SourceArrow`]'s field of the
    /// same name: the index orders the queue, not one producer.
    next_event_index: Arc<AtomicU64>,
    barrier_outstanding: AtomicBool,
    chunksize: AtomicUsize,
}

impl MultilevelArrow {
    pub fn new(
        name: impl Into<String>,
        source_id: usize,
        run_number: u32,
        sources: Vec<Box<dyn MultilevelSource>>,
        pools: Arc<PoolRegistry>,
        output: Arc<Queue<Arc<Event>>>,
        nevents: Option<u64>,
        chunksize: usize,
        next_event_index: Arc<AtomicU64>,
    ) -> Self {
        Self {
            base: ArrowBase::new(name, ArrowKind::Multilevel, false),
            source_id,
            run_number,
            sources: Mutex::new(SourceList { sources, current: 0 }),
            pools,
            output,
            pending: Mutex::new(None),
            recent: Mutex::new(BTreeMap::new()),
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

    pub fn events_emitted(&self) -> u64 {
        self.events_emitted.load(Ordering::Relaxed)
    }

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
        tracing::info!(arrow = self.base.name(), "multilevel source arrow finished");
        StepOutcome::Finished
    }

    /// The nearest coarser level with a recorded event becomes the direct
    /// parent; that event's own `parent` field already reaches any level
    /// coarser still.
    fn parent_for(&self, level: EventLevel) -> Option<Arc<Event>> {
        let recent = self.recent.lock().expect("recent-parents mutex poisoned");
        recent
            .range((Bound::Unbounded, Bound::Excluded(level)))
            .next_back()
            .map(|(_, event)| event.clone())
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

            let level = source.next_level();
            let will_be_barrier = source.next_is_barrier();
            if (will_be_barrier || self.barrier_outstanding.load(Ordering::Acquire)) && !self.is_quiescent() {
                return Ok(StepOutcome::ComeBackLater);
            }
            self.barrier_outstanding.store(false, Ordering::Release);
            self.output.clear_barrier_pending();

            let Some(pool) = self.pools.get(level) else {
                drop(sources);
                return MissingPoolSnafu { level }.fail();
            };
            let Some(event) = pool.acquire() else {
                return Ok(StepOutcome::ComeBackLater);
            };

            match source.emit(&event, self.run_number) {
                Ok(EmitOutcome::Emitted { event_number, is_barrier }) => {
                    drop(sources);
                    let event_index = self.next_event_index.fetch_add(1, Ordering::AcqRel);
                    let parent = self.parent_for(level);
                    let mut event = event;
                    Arc::get_mut(&mut event)
                        .expect("sole owner immediately after pool acquire")
                        .restamp(self.run_number, event_number, event_index, is_barrier, self.source_id, parent);
                    self.events_emitted.fetch_add(1, Ordering::AcqRel);
                    if is_barrier {
                        self.barrier_outstanding.store(true, Ordering::Release);
                        self.output.mark_barrier_pending();
                    }
                    let superseded = self
                        .recent
                        .lock()
                        .expect("recent-parents mutex poisoned")
                        .insert(level, event.clone());
                    if let Some(old) = superseded {
                        self.pools.release_chain(old);
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
                    pool.release(event);
                    return Ok(StepOutcome::ComeBackLater);
                }
                Ok(EmitOutcome::Finished) => {
                    source.finalize()?;
                    sources.current += 1;
                    drop(sources);
                    pool.release(event);
                    continue;
                }
                Err(err) => {
                    drop(sources);
                    pool.release(event);
                    return Err(err);
                }
            }
        }
    }

    pub fn base(&self) -> &ArrowBase {
        &self.base
    }

    /// Forces `Finalize` on every configured source not yet reached and
    /// marks the arrow `Finished` — the multi-level counterpart of
    /// [`crate::source::SourceArrow::force_finalize`], used by
    /// `Engine::Stop` (§4.6).
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

impl SourceSink for MultilevelArrow {
    fn mark_event_finished(&self) {
        self.notify_finished();
    }
}

#[cfg(test)]
#[path = "multilevel.test.rs"]
mod tests;
