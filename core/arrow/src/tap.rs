//! [`TapArrow`]: runs one or more [`Processor`]s over each event and
//! releases it back to its pool (§4.4.3, ordering discipline §4.7).
//!
//! Three execution modes per processor, chosen independently:
//!
//! - `Parallel` — `process` is called directly, with no framework-held
//!   lock; concurrency safety is the processor's own responsibility (the
//!   `Send + Sync` bound).
//! - `Sequential { ordered: false }` — a per-processor mutex (and, if the
//!   processor declares a `resource_name`, a mutex shared with every other
//!   processor declaring the same name) is held around the call, so calls
//!   never overlap but may still arrive out of emission order.
//! - `Sequential { ordered: true }` — events are buffered in a per-slot
//!   map keyed by `event_index` and released to `process` strictly in
//!   order, one contiguous run at a time, still under the same locks as
//!   the unordered case.

use crate::base::ArrowBase;
use crate::error::ArrowError;
use crate::kind::ArrowKind;
use crate::kind::ArrowState;
use crate::kind::StepOutcome;
use crate::source::SourceSink;
use jana_event::Event;
use jana_event::EventFailure;
use jana_event::EventLevel;
use jana_pool::PoolRegistry;
use jana_queue::Queue;
use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Instant;

/// Whether, and how, the framework serializes calls into one processor
/// (§4.4.3 / §4.7). `Parallel` is the default for processors that don't
/// need either guarantee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorMode {
    Parallel,
    Sequential { ordered: bool },
}

/// User code invoked by a `TapArrow`, typically reading results off
/// `event.factory_set()` that a `MapArrow` upstream already computed.
/// `process` takes `&self`, not `&mut self`: any serialization guarantee
/// (`mode`, `resource_name`) is enforced by the arrow holding an external
/// mutex around the call, not by the processor managing its own locking.
pub trait Processor: Send + Sync {
    fn name(&self) -> &str;

    fn mode(&self) -> ProcessorMode {
        ProcessorMode::Parallel
    }

    /// Processors declaring the same resource name are serialized against
    /// each other, even if they're otherwise independent arrows or stages
    /// — e.g. two processors both writing to one output file (§4.4.3).
    fn resource_name(&self) -> Option<&str> {
        None
    }

    fn accepts_level(&self, _level: EventLevel) -> bool {
        true
    }

    fn init(&self) -> Result<(), ArrowError> {
        Ok(())
    }

    fn process(&self, event: &Event) -> Result<(), ArrowError>;

    fn finalize(&self) -> Result<(), ArrowError> {
        Ok(())
    }
}

struct ProcessorSlot {
    processor: Box<dyn Processor>,
    mode: ProcessorMode,
    resource_name: Option<String>,
    call_lock: Mutex<()>,
    next_expected_index: AtomicU64,
    pending: Mutex<BTreeMap<u64, Arc<Event>>>,
}

impl ProcessorSlot {
    fn new(processor: Box<dyn Processor>) -> Self {
        let mode = processor.mode();
        let resource_name = processor.resource_name().map(str::to_string);
        Self {
            processor,
            mode,
            resource_name,
            call_lock: Mutex::new(()),
            next_expected_index: AtomicU64::new(0),
            pending: Mutex::new(BTreeMap::new()),
        }
    }
}

/// Sink at the end of a branch of the topology: hands each event to every
/// registered [`Processor`] that accepts its level, then releases the
/// event's whole ancestor chain back to its pools (§4.4.3, §4.4.4).
pub struct TapArrow {
    base: ArrowBase,
    input: Arc<Queue<Arc<Event>>>,
    processors: Vec<ProcessorSlot>,
    resource_locks: HashMap<String, Arc<Mutex<()>>>,
    pools: Arc<PoolRegistry>,
    source_sinks: Vec<Arc<dyn SourceSink>>,
    chunksize: usize,
}

impl TapArrow {
    pub fn new(
        name: impl Into<String>,
        input: Arc<Queue<Arc<Event>>>,
        processors: Vec<Box<dyn Processor>>,
        pools: Arc<PoolRegistry>,
        source_sinks: Vec<Arc<dyn SourceSink>>,
        chunksize: usize,
    ) -> Self {
        let mut resource_locks: HashMap<String, Arc<Mutex<()>>> = HashMap::new();
        let slots: Vec<ProcessorSlot> = processors
            .into_iter()
            .map(|processor| {
                if let Some(name) = processor.resource_name() {
                    resource_locks.entry(name.to_string()).or_insert_with(|| Arc::new(Mutex::new(())));
                }
                ProcessorSlot::new(processor)
            })
            .collect();
        Self {
            base: ArrowBase::new(name, ArrowKind::Tap, true),
            input,
            processors: slots,
            resource_locks,
            pools,
            source_sinks,
            chunksize: chunksize.max(1),
        }
    }

    pub fn base(&self) -> &ArrowBase {
        &self.base
    }

    pub fn open(&self) -> Result<(), ArrowError> {
        for slot in &self.processors {
            slot.processor.init()?;
        }
        self.base.set_state(ArrowState::Running);
        Ok(())
    }

    pub fn close(&self) -> Result<(), ArrowError> {
        for slot in &self.processors {
            slot.processor.finalize()?;
        }
        self.base.set_state(ArrowState::Finished);
        Ok(())
    }

    pub fn execute(&self) -> Result<StepOutcome, ArrowError> {
        let started = Instant::now();
        let mut processed = 0u64;

        for _ in 0..self.chunksize {
            let Some(event) = self.input.pop() else {
                break;
            };
            processed += 1;

            for slot in &self.processors {
                if slot.processor.accepts_level(event.level()) {
                    self.dispatch(slot, &event);
                }
            }

            if let Some(sink) = self.source_sinks.get(event.source_id()) {
                sink.mark_event_finished();
            }
            self.pools.release_chain(event);
        }

        self.base
            .metrics()
            .record_step(processed, started.elapsed(), started.elapsed(), std::time::Duration::ZERO);
        if processed > 0 {
            Ok(StepOutcome::KeepGoing)
        } else {
            Ok(StepOutcome::ComeBackLater)
        }
    }

    fn dispatch(&self, slot: &ProcessorSlot, event: &Arc<Event>) {
        match slot.mode {
            ProcessorMode::Parallel => {
                if let Err(err) = slot.processor.process(event) {
                    self.note_failure(slot, event, err);
                }
            }
            ProcessorMode::Sequential { ordered: false } => {
                let _resource_guard = self.lock_resource(slot);
                let _call_guard = slot.call_lock.lock().expect("processor call mutex poisoned");
                if let Err(err) = slot.processor.process(event) {
                    self.note_failure(slot, event, err);
                }
            }
            ProcessorMode::Sequential { ordered: true } => {
                {
                    let mut pending = slot.pending.lock().expect("ordering buffer mutex poisoned");
                    pending.insert(event.event_index(), event.clone());
                }
                loop {
                    let next = slot.next_expected_index.load(Ordering::Acquire);
                    let ready = {
                        let mut pending = slot.pending.lock().expect("ordering buffer mutex poisoned");
                        pending.remove(&next)
                    };
                    let Some(ready_event) = ready else {
                        break;
                    };
                    let _resource_guard = self.lock_resource(slot);
                    let _call_guard = slot.call_lock.lock().expect("processor call mutex poisoned");
                    if let Err(err) = slot.processor.process(&ready_event) {
                        self.note_failure(slot, &ready_event, err);
                    }
                    slot.next_expected_index.fetch_add(1, Ordering::AcqRel);
                }
            }
        }
    }

    fn lock_resource<'a>(&'a self, slot: &'a ProcessorSlot) -> Option<std::sync::MutexGuard<'a, ()>> {
        slot.resource_name
            .as_ref()
            .and_then(|name| self.resource_locks.get(name))
            .map(|lock| lock.lock().expect("resource mutex poisoned"))
    }

    fn note_failure(&self, slot: &ProcessorSlot, event: &Event, err: ArrowError) {
        tracing::warn!(
            arrow = self.base.name(),
            processor = slot.processor.name(),
            error = %err,
            "processor raised; event marked failed"
        );
        event.mark_failed(EventFailure::new(slot.processor.name(), err.to_string()));
    }
}

/// Convenience wrapper turning a plain closure into a minimal
/// `Parallel`-mode `Processor`, for the common case of a terminal sink
/// with no ordering or resource-serialization needs.
pub struct ClosureProcessor<F> {
    name: String,
    body: F,
}

impl<F> ClosureProcessor<F>
where
    F: Fn(&Event) -> Result<(), ArrowError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, body: F) -> Self {
        Self { name: name.into(), body }
    }
}

impl<F> Processor for ClosureProcessor<F>
where
    F: Fn(&Event) -> Result<(), ArrowError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn process(&self, event: &Event) -> Result<(), ArrowError> {
        (self.body)(event)
    }
}

#[cfg(test)]
#[path = "tap.test.rs"]
mod tests;
