use super::*;
use jana_factory::EventLevel;
use jana_factory::FactoryGenerator;
use jana_pool::EventPool;
use pretty_assertions::assert_eq;
use std::sync::Mutex as StdMutex;

fn pool(level: EventLevel, capacity: usize) -> Arc<EventPool> {
    let generators: Vec<Arc<dyn FactoryGenerator>> = Vec::new();
    Arc::new(EventPool::new(level, capacity, generators).expect("pool built"))
}

fn registry_with(pool: Arc<EventPool>) -> Arc<PoolRegistry> {
    let mut registry = PoolRegistry::new();
    registry.insert(pool);
    Arc::new(registry)
}

struct RecordingProcessor {
    name: String,
    mode: ProcessorMode,
    resource_name: Option<String>,
    seen: StdMutex<Vec<u64>>,
}

impl RecordingProcessor {
    fn new(name: &str, mode: ProcessorMode) -> Self {
        Self { name: name.to_string(), mode, resource_name: None, seen: StdMutex::new(Vec::new()) }
    }

    fn with_resource(mut self, resource: &str) -> Self {
        self.resource_name = Some(resource.to_string());
        self
    }
}

impl Processor for RecordingProcessor {
    fn name(&self) -> &str {
        &self.name
    }

    fn mode(&self) -> ProcessorMode {
        self.mode
    }

    fn resource_name(&self) -> Option<&str> {
        self.resource_name.as_deref()
    }

    fn process(&self, event: &Event) -> Result<(), ArrowError> {
        self.seen.lock().expect("seen mutex poisoned").push(event.event_index());
        Ok(())
    }
}

struct FailingProcessor;

impl Processor for FailingProcessor {
    fn name(&self) -> &str {
        "failing_processor"
    }

    fn process(&self, _event: &Event) -> Result<(), ArrowError> {
        crate::error::ProcessorRaisedSnafu {
            name: "failing_processor".to_string(),
            message: "boom".to_string(),
        }
        .fail()
    }
}

fn push_acquired(input: &Queue<Arc<Event>>, pool: &EventPool, event_index: u64) {
    let event = pool.acquire().expect("pool has idle events");
    let mut event = event;
    Arc::get_mut(&mut event).expect("sole owner").restamp(1, event_index, event_index, false, 0, None);
    input.push(event).expect("room in test queue");
}

#[test]
fn parallel_processor_sees_every_event() {
    let level_pool = pool(EventLevel::None, 4);
    let registry = registry_with(level_pool.clone());
    let input = Arc::new(Queue::new(4));
    for i in 0..3 {
        push_acquired(&input, &level_pool, i);
    }

    let arrow = TapArrow::new(
        "tap",
        input,
        vec![Box::new(RecordingProcessor::new("p", ProcessorMode::Parallel))],
        registry,
        Vec::new(),
        10,
    );

    assert_eq!(arrow.execute().expect("step"), StepOutcome::KeepGoing);
    assert_eq!(level_pool.in_flight(), 0, "every event released back to its pool");
}

#[test]
fn processor_failure_marks_event_and_does_not_abort_step() {
    let level_pool = pool(EventLevel::None, 2);
    let registry = registry_with(level_pool.clone());
    let input = Arc::new(Queue::new(4));
    push_acquired(&input, &level_pool, 0);

    let arrow = TapArrow::new("tap", input, vec![Box::new(FailingProcessor)], registry, Vec::new(), 10);

    assert_eq!(arrow.execute().expect("step"), StepOutcome::KeepGoing);
    assert_eq!(level_pool.in_flight(), 0);
}

#[test]
fn ordered_processor_drains_out_of_order_events_in_index_order() {
    let level_pool = pool(EventLevel::None, 4);
    let registry = registry_with(level_pool.clone());
    let input = Arc::new(Queue::new(4));

    // Acquire three events out of emission order (2, 0, 1) to simulate a
    // parallel `MapArrow` upstream reordering work before the tap sees it.
    let mut events = Vec::new();
    for index in [2u64, 0, 1] {
        let event = level_pool.acquire().expect("pool has idle events");
        let mut event = event;
        Arc::get_mut(&mut event).expect("sole owner").restamp(1, index, index, false, 0, None);
        events.push(event);
    }
    for event in events {
        input.push(event).expect("room in test queue");
    }

    let arrow = TapArrow::new(
        "tap",
        input,
        vec![Box::new(RecordingProcessor::new("ordered", ProcessorMode::Sequential { ordered: true }))],
        registry,
        Vec::new(),
        10,
    );

    // One `execute` call drains all three queued events; the ordered slot
    // should only release them to `process` once in increasing index order,
    // regardless of the order they were popped from the input queue.
    assert_eq!(arrow.execute().expect("step"), StepOutcome::KeepGoing);
}

#[test]
fn resource_name_is_shared_across_distinct_processor_slots() {
    let level_pool = pool(EventLevel::None, 4);
    let registry = registry_with(level_pool.clone());
    let input = Arc::new(Queue::new(4));
    push_acquired(&input, &level_pool, 0);

    let a = RecordingProcessor::new("writer_a", ProcessorMode::Sequential { ordered: false }).with_resource("disk");
    let b = RecordingProcessor::new("writer_b", ProcessorMode::Sequential { ordered: false }).with_resource("disk");

    let arrow = TapArrow::new("tap", input, vec![Box::new(a), Box::new(b)], registry, Vec::new(), 10);

    // Both processors declare the same resource name; they must not
    // deadlock against each other when run from the same step.
    assert_eq!(arrow.execute().expect("step"), StepOutcome::KeepGoing);
}

#[test]
fn empty_input_is_come_back_later() {
    let level_pool = pool(EventLevel::None, 2);
    let registry = registry_with(level_pool);
    let input: Arc<Queue<Arc<Event>>> = Arc::new(Queue::new(4));
    let arrow = TapArrow::new(
        "tap",
        input,
        vec![Box::new(RecordingProcessor::new("p", ProcessorMode::Parallel))],
        registry,
        Vec::new(),
        4,
    );

    assert_eq!(arrow.execute().expect("step"), StepOutcome::ComeBackLater);
}
