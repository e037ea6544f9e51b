use super::*;
use jana_arrow::EmitOutcome;
use jana_arrow::Processor;
use jana_event::Event;
use jana_factory::generator_for;
use jana_factory::FactoryError;
use jana_factory::FactoryHost;
use jana_factory::FactoryLogic;
use std::sync::Mutex as StdMutex;
use std::time::Duration;

struct RawFactory;

impl FactoryLogic<u64> for RawFactory {
    fn process(&mut self, _host: &dyn FactoryHost) -> Result<Vec<u64>, FactoryError> {
        // Overwritten by `CountingSource::emit`'s `insert`; this `process`
        // body only runs if something requests it before the source ever
        // does, which does not happen in these tests.
        Ok(Vec::new())
    }
}

struct DoubleFactory;

impl FactoryLogic<u64> for DoubleFactory {
    fn inputs(&self) -> Vec<jana_factory::InputDecl> {
        vec![jana_factory::InputDecl::of::<u64>("raw", jana_factory::EventLevel::None)]
    }

    fn process(&mut self, host: &dyn FactoryHost) -> Result<Vec<u64>, FactoryError> {
        let raw = jana_factory::FactorySet::get::<u64>("raw", jana_factory::EventLevel::None, host)?;
        Ok(raw.iter().map(|value| value * 2).collect())
    }
}

struct CountingSource {
    remaining: u64,
}

impl jana_arrow::EventSource for CountingSource {
    fn name(&self) -> &str {
        "counting"
    }

    fn emit(&mut self, event: &Event, _run_number: u32) -> Result<EmitOutcome, ArrowError> {
        if self.remaining == 0 {
            return Ok(EmitOutcome::Finished);
        }
        self.remaining -= 1;
        let event_number = self.remaining;
        event.factory_set().insert::<u64>("raw", vec![event_number])?;
        Ok(EmitOutcome::Emitted { event_number, is_barrier: false })
    }
}

struct RecordingProcessor {
    results: Arc<StdMutex<Vec<(u64, u64)>>>,
}

impl Processor for RecordingProcessor {
    fn name(&self) -> &str {
        "recorder"
    }

    fn process(&self, event: &Event) -> Result<(), ArrowError> {
        let doubled = jana_factory::FactorySet::get::<u64>("doubled", jana_factory::EventLevel::None, event as &dyn FactoryHost)?;
        self.results.lock().expect("results mutex poisoned").push((event.event_number(), doubled[0]));
        Ok(())
    }
}

fn fast_config(nthreads: usize) -> EngineConfig {
    EngineConfig {
        nthreads,
        chunksize: 4,
        pool_capacity: 8,
        per_event_timeout: Some(Duration::from_secs(5)),
        monitor_interval: Duration::from_millis(5),
        ..EngineConfig::default()
    }
}

/// §8 end-to-end scenario 1: one source emits 20 events, one factory
/// doubles the raw value, one processor checks `output == 2*event_number`.
#[test]
fn single_source_throughput_doubles_every_event() {
    let engine = Engine::new(fast_config(2));
    engine.registry().add_source(Box::new(CountingSource { remaining: 20 }));
    engine.registry().add_factory_generator(generator_for::<u64, _>("raw", jana_factory::EventLevel::None, || RawFactory));
    engine
        .registry()
        .add_factory_generator(generator_for::<u64, _>("doubled", jana_factory::EventLevel::None, || DoubleFactory));
    let results = Arc::new(StdMutex::new(Vec::new()));
    engine.registry().add_processor(Box::new(RecordingProcessor { results: results.clone() }));

    engine.initialize(1).expect("initialize succeeds");
    engine.run().expect("run succeeds");
    engine.stop(true).expect("stop drains and finalizes");

    assert_eq!(engine.exit_code(), 0);
    assert_eq!(engine.state(), EngineState::Finished);

    let results = results.lock().expect("results mutex poisoned");
    assert_eq!(results.len(), 20);
    for (event_number, doubled) in results.iter() {
        assert_eq!(*doubled, 2 * event_number);
    }

    let report = engine.status_report();
    assert_eq!(report.arrows.len(), 3);
}

/// §8 boundary: queue capacity pinned to 1 while the pool still holds
/// every in-flight event — sustained load must drain through the single
/// slot rather than deadlock, proving `queue_capacity` is independent of
/// `pool_capacity`.
#[test]
fn queue_capacity_one_does_not_deadlock_under_sustained_load() {
    let config = EngineConfig {
        queue_capacity: 1,
        pool_capacity: 20,
        ..fast_config(2)
    };
    let engine = Engine::new(config);
    engine.registry().add_source(Box::new(CountingSource { remaining: 20 }));
    engine.registry().add_factory_generator(generator_for::<u64, _>("raw", jana_factory::EventLevel::None, || RawFactory));
    engine
        .registry()
        .add_factory_generator(generator_for::<u64, _>("doubled", jana_factory::EventLevel::None, || DoubleFactory));
    let results = Arc::new(StdMutex::new(Vec::new()));
    engine.registry().add_processor(Box::new(RecordingProcessor { results: results.clone() }));

    engine.initialize(1).expect("initialize succeeds");
    engine.run().expect("run succeeds");
    engine.stop(true).expect("stop drains and finalizes");

    assert_eq!(engine.exit_code(), 0);
    assert_eq!(results.lock().expect("results mutex poisoned").len(), 20);
}

/// §8 boundary: `nevents=0` starts the topology, emits nothing, and
/// finalizes cleanly with exit code 0.
#[test]
fn nevents_zero_finalizes_cleanly() {
    let mut config = fast_config(1);
    config.nevents = Some(0);
    let engine = Engine::new(config);
    engine.registry().add_source(Box::new(CountingSource { remaining: 20 }));
    let results = Arc::new(StdMutex::new(Vec::new()));
    engine.registry().add_processor(Box::new(RecordingProcessor { results: results.clone() }));

    engine.initialize(1).expect("initialize succeeds");
    engine.run().expect("run succeeds");
    engine.stop(true).expect("stop drains and finalizes");

    assert_eq!(engine.exit_code(), 0);
    assert!(results.lock().expect("results mutex poisoned").is_empty());
}

/// A source that returns `Finished` on its very first call still lets the
/// topology finalize cleanly (§8 boundary behaviors).
#[test]
fn source_finished_immediately_finalizes_cleanly() {
    let engine = Engine::new(fast_config(1));
    engine.registry().add_source(Box::new(CountingSource { remaining: 0 }));

    engine.initialize(1).expect("initialize succeeds");
    engine.run().expect("run succeeds");
    engine.stop(true).expect("stop drains and finalizes");

    assert_eq!(engine.exit_code(), 0);
}

#[test]
fn run_before_initialize_is_an_invalid_state_error() {
    let engine = Engine::new(EngineConfig::default());
    let err = engine.run().unwrap_err();
    assert!(matches!(err, EngineError::InvalidState { operation: "Run", .. }));
}

#[test]
fn scale_before_initialize_is_an_invalid_state_error() {
    let engine = Engine::new(EngineConfig::default());
    let err = engine.scale(4).unwrap_err();
    assert!(matches!(err, EngineError::InvalidState { operation: "Scale", .. }));
}

#[test]
fn double_initialize_is_rejected() {
    let engine = Engine::new(fast_config(1));
    engine.registry().add_source(Box::new(CountingSource { remaining: 0 }));
    engine.initialize(1).expect("first initialize succeeds");
    let err = engine.initialize(1).unwrap_err();
    assert!(matches!(err, EngineError::InvalidState { operation: "Initialize", .. }));
}

/// `nthreads=1` runs the same topology through a single worker; behavior
/// should be identical to the multi-threaded case (§8 boundary behaviors).
#[test]
fn single_thread_topology_produces_the_same_results() {
    let engine = Engine::new(fast_config(1));
    engine.registry().add_source(Box::new(CountingSource { remaining: 10 }));
    engine
        .registry()
        .add_factory_generator(generator_for::<u64, _>("raw", jana_factory::EventLevel::None, || RawFactory));
    engine
        .registry()
        .add_factory_generator(generator_for::<u64, _>("doubled", jana_factory::EventLevel::None, || DoubleFactory));
    let results = Arc::new(StdMutex::new(Vec::new()));
    engine.registry().add_processor(Box::new(RecordingProcessor { results: results.clone() }));

    engine.initialize(7).expect("initialize succeeds");
    engine.run().expect("run succeeds");
    engine.stop(true).expect("stop drains and finalizes");

    let results = results.lock().expect("results mutex poisoned");
    assert_eq!(results.len(), 10);
}
