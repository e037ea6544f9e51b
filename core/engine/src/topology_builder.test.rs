use super::*;
use jana_arrow::EmitOutcome;
use pretty_assertions::assert_eq;

struct CountingSource {
    name: &'static str,
    remaining: u64,
}

impl EventSource for CountingSource {
    fn name(&self) -> &str {
        self.name
    }

    fn emit(&mut self, _event: &Event, _run_number: u32) -> Result<EmitOutcome, jana_arrow::ArrowError> {
        if self.remaining == 0 {
            return Ok(EmitOutcome::Finished);
        }
        self.remaining -= 1;
        Ok(EmitOutcome::Emitted { event_number: self.remaining, is_barrier: false })
    }
}

struct NoopProcessor;

impl jana_arrow::Processor for NoopProcessor {
    fn name(&self) -> &str {
        "noop"
    }

    fn process(&self, _event: &Event) -> Result<(), jana_arrow::ArrowError> {
        Ok(())
    }
}

#[test]
fn single_source_builds_a_three_arrow_topology() {
    let registry = ComponentRegistry::new();
    registry.add_source(Box::new(CountingSource { name: "s", remaining: 5 }));
    registry.add_processor(Box::new(NoopProcessor));

    let config = EngineConfig::default();
    let built = build(&config, &registry, 1).expect("builds");

    assert_eq!(built.topology.arrows().len(), 3);
    assert_eq!(built.queues.len(), 2);
}

#[test]
fn two_sources_merge_onto_one_shared_queue() {
    let registry = ComponentRegistry::new();
    registry.add_source(Box::new(CountingSource { name: "a", remaining: 3 }));
    registry.add_source(Box::new(CountingSource { name: "b", remaining: 3 }));

    let config = EngineConfig::default();
    let built = build(&config, &registry, 1).expect("builds");

    // Two sources, one map, one tap.
    assert_eq!(built.topology.arrows().len(), 4);
    let source_to_map = built
        .queues
        .iter()
        .find(|(name, _)| name == "source_to_map")
        .map(|(_, queue)| queue)
        .expect("shared merge queue exists");
    assert_eq!(source_to_map.capacity(), config.queue_capacity);
}

/// §8's two-source merge scenario requires "no event_index collisions" —
/// every source built by `build` must draw from one shared counter rather
/// than starting its own at zero.
#[test]
fn merged_sources_never_repeat_an_event_index() {
    let registry = ComponentRegistry::new();
    registry.add_source(Box::new(CountingSource { name: "a", remaining: 4 }));
    registry.add_source(Box::new(CountingSource { name: "b", remaining: 4 }));

    let config = EngineConfig::default();
    let built = build(&config, &registry, 1).expect("builds");
    let source_to_map = built
        .queues
        .iter()
        .find(|(name, _)| name == "source_to_map")
        .map(|(_, queue)| queue)
        .expect("shared merge queue exists");

    let sources = built
        .topology
        .arrows()
        .iter()
        .filter(|a| matches!(a.kind(), jana_arrow::ArrowKind::Source | jana_arrow::ArrowKind::Multilevel));
    for arrow in sources {
        for _ in 0..4 {
            let _ = arrow.execute();
        }
    }

    let mut indices = Vec::new();
    while let Some(event) = source_to_map.pop() {
        indices.push(event.event_index());
    }
    let unique: std::collections::HashSet<_> = indices.iter().copied().collect();
    assert_eq!(indices.len(), unique.len(), "event_index collided across merged sources: {indices:?}");
}

#[test]
fn empty_registry_still_builds_a_valid_topology() {
    let registry = ComponentRegistry::new();
    let config = EngineConfig::default();
    let built = build(&config, &registry, 1).expect("builds even with nothing registered");

    assert_eq!(built.topology.arrows().len(), 2);
}

#[test]
fn unresolvable_auto_activate_request_fails_closed() {
    let registry = ComponentRegistry::new();
    let mut config = EngineConfig::default();
    config.auto_activate.push(("not_registered".to_string(), "x".to_string()));

    let err = build(&config, &registry, 1).unwrap_err();
    assert!(matches!(err, EngineError::UnknownAutoActivation { .. }));
}
