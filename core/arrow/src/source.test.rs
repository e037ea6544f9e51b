use super::*;
use jana_factory::EventLevel;
use pretty_assertions::assert_eq;

struct CountingSource {
    name: &'static str,
    remaining: u64,
    next_number: u64,
    barrier_at: Option<u64>,
    try_again_once: bool,
}

impl EventSource for CountingSource {
    fn name(&self) -> &str {
        self.name
    }

    fn next_is_barrier(&self) -> bool {
        self.barrier_at == Some(self.next_number)
    }

    fn emit(&mut self, event: &Event, _run_number: u32) -> Result<EmitOutcome, ArrowError> {
        let _ = event;
        if self.try_again_once {
            self.try_again_once = false;
            return Ok(EmitOutcome::TryAgain);
        }
        if self.remaining == 0 {
            return Ok(EmitOutcome::Finished);
        }
        let is_barrier = self.barrier_at == Some(self.next_number);
        let event_number = self.next_number;
        self.next_number += 1;
        self.remaining -= 1;
        Ok(EmitOutcome::Emitted { event_number, is_barrier })
    }
}

fn pool(capacity: usize) -> Arc<EventPool> {
    Arc::new(EventPool::new(EventLevel::None, capacity, Vec::new()).expect("pool"))
}

#[test]
fn emits_events_in_strict_index_order() {
    let source = CountingSource {
        name: "s",
        remaining: 3,
        next_number: 100,
        barrier_at: None,
        try_again_once: false,
    };
    let output = Arc::new(Queue::new(8));
    let arrow = SourceArrow::new("source", 0, 7, vec![Box::new(source)], pool(8), output.clone(), None, 4, Arc::new(AtomicU64::new(0)));

    for _ in 0..3 {
        assert_eq!(arrow.execute().expect("step"), StepOutcome::KeepGoing);
    }
    let mut indices = Vec::new();
    while let Some(event) = output.pop() {
        indices.push(event.event_index());
    }
    indices.sort_unstable();
    assert_eq!(indices, vec![0, 1, 2]);
}

#[test]
fn try_again_returns_come_back_later_without_consuming_an_index() {
    let source = CountingSource {
        name: "s",
        remaining: 1,
        next_number: 0,
        barrier_at: None,
        try_again_once: true,
    };
    let output = Arc::new(Queue::new(8));
    let arrow = SourceArrow::new("source", 0, 1, vec![Box::new(source)], pool(4), output.clone(), None, 4, Arc::new(AtomicU64::new(0)));

    assert_eq!(arrow.execute().expect("step"), StepOutcome::ComeBackLater);
    assert_eq!(arrow.execute().expect("step"), StepOutcome::KeepGoing);
    let event = output.pop().expect("one event emitted");
    assert_eq!(event.event_index(), 0);
}

#[test]
fn exhausted_source_transitions_arrow_to_finished() {
    let source = CountingSource {
        name: "s",
        remaining: 0,
        next_number: 0,
        barrier_at: None,
        try_again_once: false,
    };
    let output = Arc::new(Queue::new(4));
    let arrow = SourceArrow::new("source", 0, 1, vec![Box::new(source)], pool(4), output, None, 4, Arc::new(AtomicU64::new(0)));

    assert_eq!(arrow.execute().expect("step"), StepOutcome::Finished);
    assert_eq!(arrow.base().state(), ArrowState::Finished);
}

#[test]
fn nevents_limit_stops_emission_even_if_source_has_more() {
    let source = CountingSource {
        name: "s",
        remaining: 100,
        next_number: 0,
        barrier_at: None,
        try_again_once: false,
    };
    let output = Arc::new(Queue::new(8));
    let arrow = SourceArrow::new("source", 0, 1, vec![Box::new(source)], pool(8), output.clone(), Some(2), 4, Arc::new(AtomicU64::new(0)));

    assert_eq!(arrow.execute().expect("step"), StepOutcome::KeepGoing);
    assert_eq!(arrow.execute().expect("step"), StepOutcome::KeepGoing);
    assert_eq!(arrow.execute().expect("step"), StepOutcome::Finished);
    assert_eq!(arrow.events_emitted(), 2);
}

#[test]
fn barrier_waits_for_quiescence_before_and_after() {
    let source = CountingSource {
        name: "s",
        remaining: 3,
        next_number: 0,
        barrier_at: Some(1),
        try_again_once: false,
    };
    let output = Arc::new(Queue::new(8));
    let arrow = SourceArrow::new("source", 0, 1, vec![Box::new(source)], pool(8), output.clone(), None, 4, Arc::new(AtomicU64::new(0)));

    // Event 0 emits normally; events_finished still 0, but it isn't a
    // barrier so quiescence isn't required yet.
    assert_eq!(arrow.execute().expect("step"), StepOutcome::KeepGoing);

    // Event 1 (the barrier) must wait until event 0 has exited.
    assert_eq!(arrow.execute().expect("step"), StepOutcome::ComeBackLater);
    arrow.notify_finished();
    assert_eq!(arrow.execute().expect("step"), StepOutcome::KeepGoing);

    // Event 2 must wait until the barrier itself has exited.
    assert_eq!(arrow.execute().expect("step"), StepOutcome::ComeBackLater);
    arrow.notify_finished();
    assert_eq!(arrow.execute().expect("step"), StepOutcome::KeepGoing);

    assert_eq!(output.size(), 3);
}
