use super::*;
use jana_factory::EventLevel;
use pretty_assertions::assert_eq;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

struct CountingStage {
    calls: AtomicUsize,
}

impl MapStage for CountingStage {
    fn name(&self) -> &str {
        "counting_stage"
    }

    fn run(&self, _event: &Event) -> Result<(), ArrowError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

struct FailingStage;

impl MapStage for FailingStage {
    fn name(&self) -> &str {
        "failing_stage"
    }

    fn run(&self, _event: &Event) -> Result<(), ArrowError> {
        crate::error::ProcessorRaisedSnafu {
            name: "failing_stage".to_string(),
            message: "boom".to_string(),
        }
        .fail()
    }
}

fn push_n(queue: &Queue<Arc<Event>>, n: u64) {
    for i in 0..n {
        let mut event = Event::new_empty(EventLevel::None);
        event.restamp(1, i, i, false, 0, None);
        queue.push(Arc::new(event)).expect("room in test queue");
    }
}

#[test]
fn runs_stage_and_forwards_every_event() {
    let input = Arc::new(Queue::new(8));
    let output = Arc::new(Queue::new(8));
    push_n(&input, 3);

    let stage = Box::new(CountingStage { calls: AtomicUsize::new(0) });
    let arrow = MapArrow::new("map", input, output.clone(), stage, 10);

    assert_eq!(arrow.execute().expect("step"), StepOutcome::KeepGoing);
    assert_eq!(output.size(), 3);
}

#[test]
fn stage_failure_marks_event_but_still_forwards_it() {
    let input = Arc::new(Queue::new(8));
    let output = Arc::new(Queue::new(8));
    push_n(&input, 1);

    let arrow = MapArrow::new("map", input, output.clone(), Box::new(FailingStage), 10);
    assert_eq!(arrow.execute().expect("step"), StepOutcome::KeepGoing);

    let event = output.pop().expect("event still forwarded despite failure");
    assert!(event.is_failed());
    assert_eq!(event.failure().unwrap().component, "failing_stage");
}

#[test]
fn empty_input_is_come_back_later() {
    let input: Arc<Queue<Arc<Event>>> = Arc::new(Queue::new(4));
    let output = Arc::new(Queue::new(4));
    let stage = Box::new(CountingStage { calls: AtomicUsize::new(0) });
    let arrow = MapArrow::new("map", input, output, stage, 4);

    assert_eq!(arrow.execute().expect("step"), StepOutcome::ComeBackLater);
}

#[test]
fn full_output_queue_buffers_and_retries() {
    let input = Arc::new(Queue::new(8));
    let output = Arc::new(Queue::new(1));
    push_n(&input, 2);

    let stage = Box::new(CountingStage { calls: AtomicUsize::new(0) });
    let arrow = MapArrow::new("map", input, output.clone(), stage, 10);

    // First event fills the 1-capacity output; the second is processed
    // (the stage ran) but can't push, so it's buffered.
    assert_eq!(arrow.execute().expect("step"), StepOutcome::KeepGoing);
    assert_eq!(output.size(), 1);

    // Draining the output and stepping again flushes the buffered event.
    output.pop().expect("drain");
    assert_eq!(arrow.execute().expect("step"), StepOutcome::KeepGoing);
    assert_eq!(output.size(), 1);
}
