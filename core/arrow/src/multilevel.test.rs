use super::*;
use pretty_assertions::assert_eq;

/// Emits the pattern from the testable-property example in §8: one Run,
/// then an alternating stream of SlowControls-style Timeslice events and
/// PhysicsEvents, ending after a fixed count.
struct AlternatingSource {
    plan: Vec<EventLevel>,
    next: usize,
}

impl AlternatingSource {
    fn new(plan: Vec<EventLevel>) -> Self {
        Self { plan, next: 0 }
    }
}

impl MultilevelSource for AlternatingSource {
    fn name(&self) -> &str {
        "alternating"
    }

    fn next_level(&self) -> EventLevel {
        self.plan.get(self.next).copied().unwrap_or(EventLevel::PhysicsEvent)
    }

    fn emit(&mut self, _event: &Event, _run_number: u32) -> Result<EmitOutcome, ArrowError> {
        if self.next >= self.plan.len() {
            return Ok(EmitOutcome::Finished);
        }
        let number = self.next as u64;
        self.next += 1;
        Ok(EmitOutcome::Emitted { event_number: number, is_barrier: false })
    }
}

fn pools() -> Arc<PoolRegistry> {
    let mut registry = PoolRegistry::new();
    registry.insert(Arc::new(jana_pool::EventPool::new(EventLevel::Run, 2, Vec::new()).expect("run pool")));
    registry.insert(Arc::new(
        jana_pool::EventPool::new(EventLevel::Timeslice, 2, Vec::new()).expect("timeslice pool"),
    ));
    registry.insert(Arc::new(
        jana_pool::EventPool::new(EventLevel::PhysicsEvent, 4, Vec::new()).expect("physics pool"),
    ));
    Arc::new(registry)
}

#[test]
fn physics_events_attach_to_most_recent_run_and_timeslice() {
    let plan = vec![
        EventLevel::Run,
        EventLevel::Timeslice,
        EventLevel::PhysicsEvent,
        EventLevel::PhysicsEvent,
    ];
    let source = Box::new(AlternatingSource::new(plan));
    let pools = pools();
    let output = Arc::new(Queue::new(8));
    let arrow = MultilevelArrow::new("ml", 0, 1, vec![source], pools, output.clone(), None, 4, Arc::new(AtomicU64::new(0)));

    arrow.opens().expect("opens");
    for _ in 0..4 {
        arrow.execute().expect("step");
    }

    let run = output.pop().expect("run event");
    assert_eq!(run.level(), EventLevel::Run);
    assert!(run.parent_at(EventLevel::Run).is_none());

    let timeslice = output.pop().expect("timeslice event");
    assert_eq!(timeslice.level(), EventLevel::Timeslice);
    assert!(std::ptr::eq(timeslice.parent_at(EventLevel::Run).unwrap(), run.as_ref()));

    let physics_one = output.pop().expect("first physics event");
    assert!(std::ptr::eq(physics_one.parent_at(EventLevel::Run).unwrap(), run.as_ref()));
    assert!(std::ptr::eq(
        physics_one.parent_at(EventLevel::Timeslice).unwrap(),
        timeslice.as_ref(),
    ));

    let physics_two = output.pop().expect("second physics event");
    assert!(std::ptr::eq(physics_two.parent_at(EventLevel::Run).unwrap(), run.as_ref()));
    assert!(std::ptr::eq(
        physics_two.parent_at(EventLevel::Timeslice).unwrap(),
        timeslice.as_ref(),
    ));
}

#[test]
fn newer_timeslice_supersedes_older_one_as_parent() {
    let plan = vec![
        EventLevel::Run,
        EventLevel::Timeslice,
        EventLevel::PhysicsEvent,
        EventLevel::Timeslice,
        EventLevel::PhysicsEvent,
    ];
    let source = Box::new(AlternatingSource::new(plan));
    let pools = pools();
    let output = Arc::new(Queue::new(8));
    let arrow = MultilevelArrow::new("ml", 0, 1, vec![source], pools, output.clone(), None, 8, Arc::new(AtomicU64::new(0)));

    arrow.opens().expect("opens");
    for _ in 0..5 {
        arrow.execute().expect("step");
    }

    let _run = output.pop().expect("run");
    let first_timeslice = output.pop().expect("first timeslice");
    let first_physics = output.pop().expect("first physics");
    assert!(std::ptr::eq(
        first_physics.parent_at(EventLevel::Timeslice).unwrap(),
        first_timeslice.as_ref(),
    ));

    let second_timeslice = output.pop().expect("second timeslice");
    let second_physics = output.pop().expect("second physics");
    assert!(std::ptr::eq(
        second_physics.parent_at(EventLevel::Timeslice).unwrap(),
        second_timeslice.as_ref(),
    ));
    assert!(!std::ptr::eq(first_timeslice.as_ref(), second_timeslice.as_ref()));
}

#[test]
fn missing_pool_for_declared_level_is_an_error() {
    let source = Box::new(AlternatingSource::new(vec![EventLevel::Block]));
    let mut registry = PoolRegistry::new();
    registry.insert(Arc::new(jana_pool::EventPool::new(EventLevel::Run, 1, Vec::new()).expect("run pool")));
    let output = Arc::new(Queue::new(4));
    let arrow = MultilevelArrow::new("ml", 0, 1, vec![source], Arc::new(registry), output, None, 4, Arc::new(AtomicU64::new(0)));

    arrow.opens().expect("opens");
    let err = arrow.execute().expect_err("no pool registered for Block");
    assert!(matches!(err, ArrowError::MissingPool { level: EventLevel::Block }));
}

/// Mirrors what a `TapArrow` does with every event it pops: release its
/// whole ancestor chain. Run after each `execute()` step below to model a
/// downstream consumer draining the queue as fast as it's filled.
fn drain_and_release(output: &Queue<Arc<Event>>, pools: &PoolRegistry) {
    while let Some(event) = output.pop() {
        pools.release_chain(event);
    }
}

/// Once a level's entry in `recent` is superseded, the event it used to
/// hold has to make it back to its pool once nothing else references it —
/// not just get dropped in place (regression for `recent.insert`'s
/// replaced value being silently discarded, which permanently shrinks the
/// pool by one event per supersession). With a real consumer draining the
/// output queue and releasing each ancestor chain, three full
/// Timeslice/PhysicsEvent cycles should leave exactly one event of each
/// level checked out — the one still recorded as "most recent" — not
/// three.
#[test]
fn superseding_a_level_in_recent_releases_it_back_to_the_pool() {
    let plan = vec![
        EventLevel::Timeslice,
        EventLevel::PhysicsEvent,
        EventLevel::Timeslice,
        EventLevel::PhysicsEvent,
        EventLevel::Timeslice,
        EventLevel::PhysicsEvent,
    ];
    let source = Box::new(AlternatingSource::new(plan));
    let mut registry = PoolRegistry::new();
    registry.insert(Arc::new(jana_pool::EventPool::new(EventLevel::Timeslice, 4, Vec::new()).expect("timeslice pool")));
    registry.insert(Arc::new(
        jana_pool::EventPool::new(EventLevel::PhysicsEvent, 4, Vec::new()).expect("physics pool"),
    ));
    let pools = Arc::new(registry);
    let output = Arc::new(Queue::new(8));
    let arrow = MultilevelArrow::new("ml", 0, 1, vec![source], pools.clone(), output.clone(), None, 1, Arc::new(AtomicU64::new(0)));

    arrow.opens().expect("opens");
    for _ in 0..6 {
        assert_eq!(arrow.execute().expect("step"), StepOutcome::KeepGoing);
        drain_and_release(&output, &pools);
    }

    let timeslice_pool = pools.get(EventLevel::Timeslice).expect("timeslice pool");
    let physics_pool = pools.get(EventLevel::PhysicsEvent).expect("physics pool");
    assert_eq!(timeslice_pool.in_flight(), 1, "only the current recent Timeslice should still be checked out");
    assert_eq!(physics_pool.in_flight(), 1, "only the current recent PhysicsEvent should still be checked out");
}
