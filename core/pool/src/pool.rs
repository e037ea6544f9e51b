//! [`EventPool`]: a bounded, recyclable store of `Event`s for one level.

use crate::error::DownscaleForbiddenSnafu;
use crate::error::ExhaustedSnafu;
use crate::error::PoolError;
use jana_event::Event;
use jana_event::EventLevel;
use jana_factory::FactoryGenerator;
use jana_queue::Queue;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::RwLock;

/// A bounded, pre-allocated ring of `Event`s at one `EventLevel`, used to
/// throttle in-flight work: the sum of events idle in the pool and events
/// in flight at this level is invariant, equal to the pool's capacity.
pub struct EventPool {
    level: EventLevel,
    generators: Vec<Arc<dyn FactoryGenerator>>,
    idle: RwLock<Queue<Event>>,
    capacity: AtomicUsize,
    in_flight: AtomicUsize,
}

impl EventPool {
    /// Allocates `capacity` events at `level`, registering every generator
    /// declared for that level into each event's factory set.
    pub fn new(
        level: EventLevel,
        capacity: usize,
        generators: Vec<Arc<dyn FactoryGenerator>>,
    ) -> Result<Self, PoolError> {
        if capacity == 0 {
            return ExhaustedSnafu {
                level,
                requested: capacity,
            }
            .fail();
        }
        let relevant: Vec<_> = generators.iter().filter(|g| g.level() == level).cloned().collect();
        let idle = Queue::new(capacity);
        for _ in 0..capacity {
            let event = build_event(level, &relevant);
            idle.push(event)
                .map_err(|_| ExhaustedSnafu { level, requested: capacity }.build())?;
        }
        Ok(Self {
            level,
            generators,
            idle: RwLock::new(idle),
            capacity: AtomicUsize::new(capacity),
            in_flight: AtomicUsize::new(0),
        })
    }

    pub fn level(&self) -> EventLevel {
        self.level
    }

    pub fn capacity(&self) -> usize {
        self.capacity.load(Ordering::Relaxed)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Relaxed)
    }

    /// Pulls an idle event from the pool, ready for a source to
    /// `restamp` with fresh identity. Returns `None` if every event at
    /// this level is currently in flight — a scheduling signal (the
    /// caller backs off), not an error.
    pub fn acquire(&self) -> Option<Arc<Event>> {
        let guard = self.idle.read().expect("event pool lock poisoned");
        let event = guard.pop()?;
        self.in_flight.fetch_add(1, Ordering::Relaxed);
        Some(Arc::new(event))
    }

    /// Releases one handle to `event`. If this was the last shared
    /// handle, the event's factory set is reset and it's returned to the
    /// idle queue, and this returns the event's own parent handle (if
    /// any) so the caller can chain the release up the ancestor levels —
    /// releasing a child relinquishes the child's one handle on its
    /// parent too. Returns `None` both when another holder still shares
    /// `event` (an ordering buffer, a forwarding-pool slot) and when the
    /// recycled event had no parent.
    pub fn release(&self, event: Arc<Event>) -> Option<Arc<Event>> {
        match Arc::try_unwrap(event) {
            Ok(mut owned) => {
                let parent = owned.take_parent();
                owned.factory_set_mut().reset_for_recycle();
                let guard = self.idle.read().expect("event pool lock poisoned");
                guard
                    .push(owned)
                    .unwrap_or_else(|_| panic!("released more events than the pool's capacity for {}", self.level));
                self.in_flight.fetch_sub(1, Ordering::Relaxed);
                parent
            }
            Err(_still_shared) => {
                // Another holder (e.g. an ordering buffer) retains a
                // reference; it will release its own handle in turn.
                None
            }
        }
    }

    /// Grows the pool by `additional` events, constructing and registering
    /// them exactly as at startup. Forbidden to go the other direction:
    /// shared ownership of in-flight events makes bounded shrink-while-
    /// running impossible to do safely.
    pub fn scale_up(&self, additional: usize) -> Result<(), PoolError> {
        if additional == 0 {
            return Ok(());
        }
        let relevant: Vec<_> = self
            .generators
            .iter()
            .filter(|g| g.level() == self.level)
            .cloned()
            .collect();
        let mut guard = self.idle.write().expect("event pool lock poisoned");
        let new_capacity = self.capacity() + additional;
        let bigger = Queue::new(new_capacity);
        while let Some(event) = guard.pop() {
            bigger
                .push(event)
                .unwrap_or_else(|_| panic!("migrated event lost while growing pool for {}", self.level));
        }
        for _ in 0..additional {
            bigger
                .push(build_event(self.level, &relevant))
                .map_err(|_| {
                    ExhaustedSnafu {
                        level: self.level,
                        requested: additional,
                    }
                    .build()
                })?;
        }
        *guard = bigger;
        self.capacity.store(new_capacity, Ordering::Relaxed);
        Ok(())
    }

    /// Always fails: downscaling is forbidden while the engine runs (§4.2)
    /// because in-flight events hold shared ownership the pool cannot
    /// safely revoke. Kept as an explicit API so callers get a typed error
    /// instead of silently ignoring a shrink request.
    pub fn scale_down(&self, _removed: usize) -> Result<(), PoolError> {
        DownscaleForbiddenSnafu { level: self.level }.fail()
    }
}

fn build_event(level: EventLevel, generators: &[Arc<dyn FactoryGenerator>]) -> Event {
    let mut event = Event::new_empty(level);
    for generator in generators {
        event
            .factory_set_mut()
            .register(generator.key(), generator.instantiate());
    }
    event
}

#[cfg(test)]
#[path = "pool.test.rs"]
mod tests;
