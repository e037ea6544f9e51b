use super::*;
use crate::error::ArrowError;
use crate::map::MapStage;
use crate::source::EmitOutcome;
use crate::source::EventSource;
use jana_event::Event;
use jana_factory::EventLevel;
use jana_pool::EventPool;
use jana_queue::Queue;
use pretty_assertions::assert_eq;
use std::sync::atomic::AtomicU64;

struct OnceSource(bool);

impl EventSource for OnceSource {
    fn name(&self) -> &str {
        "once"
    }

    fn emit(&mut self, _event: &Event, _run_number: u32) -> Result<EmitOutcome, ArrowError> {
        if self.0 {
            self.0 = false;
            Ok(EmitOutcome::Emitted { event_number: 0, is_barrier: false })
        } else {
            Ok(EmitOutcome::Finished)
        }
    }
}

struct NoopStage;

impl MapStage for NoopStage {
    fn name(&self) -> &str {
        "noop"
    }

    fn run(&self, _event: &Event) -> Result<(), ArrowError> {
        Ok(())
    }
}

fn pools() -> Arc<PoolRegistry> {
    let mut registry = PoolRegistry::new();
    registry.insert(Arc::new(EventPool::new(EventLevel::None, 4, Vec::new()).expect("pool")));
    Arc::new(registry)
}

#[test]
fn source_map_tap_chain_builds_without_orphan_or_cycle() {
    let pools = pools();
    let source_to_map = Arc::new(Queue::new(4));
    let map_to_tap = Arc::new(Queue::new(4));

    let source: Arc<dyn ArrowStep> = Arc::new(SourceArrow::new(
        "src",
        0,
        1,
        vec![Box::new(OnceSource(true))],
        pools.get(EventLevel::None).unwrap().clone(),
        source_to_map.clone(),
        None,
        4,
        Arc::new(AtomicU64::new(0)),
    ));
    let map: Arc<dyn ArrowStep> =
        Arc::new(MapArrow::new("map", source_to_map, map_to_tap.clone(), Box::new(NoopStage), 4));
    let tap: Arc<dyn ArrowStep> = Arc::new(TapArrow::new("tap", map_to_tap, Vec::new(), pools.clone(), Vec::new(), 4));

    let mut builder = TopologyBuilder::new(pools);
    builder
        .add_arrow(source)
        .add_arrow(map)
        .add_arrow(tap)
        .bind_port("q1", "src", PortRole::Output)
        .bind_port("q1", "map", PortRole::Input)
        .bind_port("q2", "map", PortRole::Output)
        .bind_port("q2", "tap", PortRole::Input);

    let topology = builder.build().expect("valid topology");
    assert_eq!(topology.arrows().len(), 3);
}

#[test]
fn orphan_port_is_rejected() {
    let pools = pools();
    let mut builder = TopologyBuilder::new(pools);
    builder.bind_port("dangling", "ghost_producer", PortRole::Output);

    let err = builder.build().expect_err("a queue with no consumer is an orphan port");
    assert!(matches!(err, ArrowError::OrphanPort { .. }));
}

#[test]
fn cycle_among_parallel_arrows_is_rejected() {
    let pools = pools();
    let q1: Arc<Queue<Arc<Event>>> = Arc::new(Queue::new(4));
    let q2: Arc<Queue<Arc<Event>>> = Arc::new(Queue::new(4));

    let map_a: Arc<dyn ArrowStep> = Arc::new(MapArrow::new("a", q1.clone(), q2.clone(), Box::new(NoopStage), 4));
    let map_b: Arc<dyn ArrowStep> = Arc::new(MapArrow::new("b", q2, q1, Box::new(NoopStage), 4));

    let mut builder = TopologyBuilder::new(pools);
    builder
        .add_arrow(map_a)
        .add_arrow(map_b)
        .bind_port("q1", "a", PortRole::Output)
        .bind_port("q1", "b", PortRole::Input)
        .bind_port("q2", "b", PortRole::Output)
        .bind_port("q2", "a", PortRole::Input);

    let err = builder.build().expect_err("a -> b -> a is a cycle among parallel arrows");
    assert!(matches!(err, ArrowError::ParallelCycle { .. }));
}
