//! [`Event`]: identifiers, level, ancestor chain, and the factory set a
//! worker processes it through.
//!
//! Every identity field here (`run_number`, `event_number`, `event_index`,
//! `level`, `is_barrier`, `parent`) is written exactly once, by whichever
//! code has exclusive ownership of the `Event` at the time — either a fresh
//! allocation at pool-construction time, or a pool recycle that hands back
//! plain ownership (not a shared `Arc`) to `jana-pool` before the event is
//! re-emitted. Once an `Event` is wrapped in an `Arc` and pushed into a
//! queue, every field below is read-only for the rest of its time in the
//! topology, so no interior mutability is needed for them — only
//! `FactorySet` (already its own `Mutex`-protected cache) is touched
//! concurrently while the event is in flight.

use crate::failure::EventFailure;
use jana_factory::EventLevel;
use jana_factory::FactoryHost;
use jana_factory::FactorySet;
use std::sync::Arc;
use std::sync::Mutex;

/// One unit of work flowing through the topology: a run/event identifier
/// pair, a monotone emission index, a level tag, an optional coarser-level
/// parent, and the factory set that caches everything computed for it.
pub struct Event {
    run_number: u32,
    event_number: u64,
    event_index: u64,
    level: EventLevel,
    is_barrier: bool,
    source_id: usize,
    parent: Option<Arc<Event>>,
    factory_set: FactorySet,
    /// Set by a `MapArrow` when a factory or stage body raises; read by
    /// the next `TapArrow` so processors can decide whether to skip a
    /// failed event or terminate the run (§7 propagation policy).
    failure: Mutex<Option<EventFailure>>,
}

impl Event {
    /// Builds a fresh, parentless event with an empty factory set — the
    /// shape a level pool allocates at construction time, before any
    /// generator has registered factories into it.
    pub fn new_empty(level: EventLevel) -> Self {
        Self {
            run_number: 0,
            event_number: 0,
            event_index: 0,
            level,
            is_barrier: false,
            source_id: 0,
            parent: None,
            factory_set: FactorySet::new(),
            failure: Mutex::new(None),
        }
    }

    pub fn builder() -> EventBuilder {
        EventBuilder::default()
    }

    pub fn run_number(&self) -> u32 {
        self.run_number
    }

    pub fn event_number(&self) -> u64 {
        self.event_number
    }

    /// Monotone position in emission order, assigned by the source. The
    /// sole ordering key `TapArrow`'s ordered-processor discipline relies
    /// on; `event_number` is free-form metadata by comparison.
    pub fn event_index(&self) -> u64 {
        self.event_index
    }

    pub fn level(&self) -> EventLevel {
        self.level
    }

    pub fn is_barrier(&self) -> bool {
        self.is_barrier
    }

    /// Identifies which configured source emitted this event; used by the
    /// multi-level coordinator's parent-attachment rule ("most recently
    /// emitted event at level L from the same source").
    pub fn source_id(&self) -> usize {
        self.source_id
    }

    pub fn parent_at(&self, level: EventLevel) -> Option<&Event> {
        match &self.parent {
            Some(parent) if parent.level == level => Some(parent),
            Some(parent) => parent.parent_at(level),
            None => None,
        }
    }

    /// Takes this event's direct parent handle, leaving `None` behind.
    /// Used by `jana-pool`'s recycle path: releasing a child event also
    /// relinquishes the child's one handle on its parent, so the parent's
    /// own pool can recycle it once every other holder has done the same.
    pub fn take_parent(&mut self) -> Option<Arc<Event>> {
        self.parent.take()
    }

    /// Marks this event as failed. Overwrites any previous failure — a
    /// `MapArrow` only records the first failure it observes per event in
    /// practice, but this type itself doesn't enforce that.
    pub fn mark_failed(&self, failure: EventFailure) {
        *self.failure.lock().expect("event failure mutex poisoned") = Some(failure);
    }

    pub fn failure(&self) -> Option<EventFailure> {
        self.failure.lock().expect("event failure mutex poisoned").clone()
    }

    pub fn is_failed(&self) -> bool {
        self.failure.lock().expect("event failure mutex poisoned").is_some()
    }

    pub fn factory_set(&self) -> &FactorySet {
        &self.factory_set
    }

    /// Exclusive access to the factory set, valid only while this `Event`
    /// is not yet shared via `Arc` — during generator registration at pool
    /// construction, or immediately after a recycle hands ownership back.
    pub fn factory_set_mut(&mut self) -> &mut FactorySet {
        &mut self.factory_set
    }

    /// Re-stamps identity fields for reuse from the pool. Callable only
    /// while this `Event` is exclusively owned (i.e. not currently wrapped
    /// in a shared `Arc`), which `jana-pool`'s recycle path guarantees by
    /// construction.
    #[allow(clippy::too_many_arguments)]
    pub fn restamp(
        &mut self,
        run_number: u32,
        event_number: u64,
        event_index: u64,
        is_barrier: bool,
        source_id: usize,
        parent: Option<Arc<Event>>,
    ) {
        self.run_number = run_number;
        self.event_number = event_number;
        self.event_index = event_index;
        self.is_barrier = is_barrier;
        self.source_id = source_id;
        self.parent = parent;
        *self.failure.get_mut().expect("event failure mutex poisoned") = None;
    }
}

impl FactoryHost for Event {
    fn run_number(&self) -> u32 {
        self.run_number
    }

    fn event_number(&self) -> u64 {
        self.event_number
    }

    fn level(&self) -> EventLevel {
        self.level
    }

    fn factory_set(&self) -> &FactorySet {
        &self.factory_set
    }

    fn ancestor(&self, level: EventLevel) -> Option<&dyn FactoryHost> {
        let parent = self.parent.as_ref()?;
        if parent.level == level {
            Some(parent.as_ref() as &dyn FactoryHost)
        } else {
            parent.ancestor(level)
        }
    }
}

/// Builds a fresh, fully-addressed [`Event`] in one expression — used by
/// sources and by tests that don't go through a pool.
#[derive(Default)]
pub struct EventBuilder {
    run_number: u32,
    event_number: u64,
    event_index: u64,
    level: EventLevel,
    is_barrier: bool,
    source_id: usize,
    parent: Option<Arc<Event>>,
}

impl EventBuilder {
    pub fn run_number(mut self, run_number: u32) -> Self {
        self.run_number = run_number;
        self
    }

    pub fn event_number(mut self, event_number: u64) -> Self {
        self.event_number = event_number;
        self
    }

    pub fn event_index(mut self, event_index: u64) -> Self {
        self.event_index = event_index;
        self
    }

    pub fn level(mut self, level: EventLevel) -> Self {
        self.level = level;
        self
    }

    pub fn barrier(mut self, is_barrier: bool) -> Self {
        self.is_barrier = is_barrier;
        self
    }

    pub fn source_id(mut self, source_id: usize) -> Self {
        self.source_id = source_id;
        self
    }

    pub fn parent(mut self, parent: Option<Arc<Event>>) -> Self {
        self.parent = parent;
        self
    }

    pub fn build(self) -> Event {
        Event {
            run_number: self.run_number,
            event_number: self.event_number,
            event_index: self.event_index,
            level: self.level,
            is_barrier: self.is_barrier,
            source_id: self.source_id,
            parent: self.parent,
            factory_set: FactorySet::new(),
            failure: Mutex::new(None),
        }
    }
}

#[cfg(test)]
#[path = "event.test.rs"]
mod tests;
