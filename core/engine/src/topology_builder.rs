//! Assembles a [`jana_arrow::Topology`] from a drained [`ComponentRegistry`]
//! plus [`EngineConfig`] (§4.4 arrow kinds, §4.8 multi-level forwarding, §4
//! supplemented `auto_activate` feature).
//!
//! One [`SourceArrow`]/[`MultilevelArrow`] is built per registered source,
//! each with its own `source_id`, all producing onto a single shared
//! `source_to_map` queue — the queue's ordinary multi-producer semantics is
//! what gives a multi-source topology its "merge" behavior (§8 two-source
//! merge scenario), with no separate `Merge` arrow kind needed. All of them
//! share one `event_index` counter, since the index is an ordering property
//! of the queue they feed, not of any one source. A single `MapArrow` runs
//! `--auto_activate` forcing before everything reaches the one `TapArrow`
//! that fans out to every registered processor.

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::registry::run_activations;
use crate::registry::ComponentRegistry;
use jana_arrow::ArrowStep;
use jana_arrow::EventSource;
use jana_arrow::MapArrow;
use jana_arrow::MapStage;
use jana_arrow::MultilevelArrow;
use jana_arrow::PortRole;
use jana_arrow::SourceArrow;
use jana_arrow::SourceSink;
use jana_arrow::TapArrow;
use jana_arrow::Topology;
use jana_arrow::TopologyBuilder;
use jana_event::Event;
use jana_factory::EventLevel;
use jana_factory::FactoryGenerator;
use jana_factory::FactoryHost;
use jana_pool::EventPool;
use jana_pool::PoolRegistry;
use jana_queue::Queue;
use std::collections::HashSet;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;

/// Every declared level, in coarse-to-fine order — used when at least one
/// multi-level source is registered, since a [`jana_arrow::MultilevelSource`]
/// doesn't declare its set of levels ahead of time (only the next one, per
/// call).
const ALL_LEVELS: [EventLevel; 8] = [
    EventLevel::Run,
    EventLevel::Subrun,
    EventLevel::Timeslice,
    EventLevel::Block,
    EventLevel::PhysicsEvent,
    EventLevel::Subevent,
    EventLevel::Task,
    EventLevel::None,
];

/// A validated [`Topology`] plus the queues inside it, keyed by label — the
/// status report walks these for occupancy (§6 "Status pipe").
pub struct BuiltTopology {
    pub topology: Topology,
    pub queues: Vec<(String, Arc<Queue<Arc<Event>>>)>,
}

struct AutoActivateStage {
    activations:
        Vec<Arc<dyn Fn(&dyn FactoryHost) -> Result<(), jana_factory::FactoryError> + Send + Sync>>,
}

impl MapStage for AutoActivateStage {
    fn name(&self) -> &str {
        "auto_activate"
    }

    fn run(&self, event: &Event) -> Result<(), jana_arrow::ArrowError> {
        run_activations(&self.activations, event as &dyn FactoryHost)
    }
}

fn build_pools(
    config: &EngineConfig,
    generators: Vec<Box<dyn FactoryGenerator>>,
    has_multilevel: bool,
    plain_source_levels: &HashSet<EventLevel>,
) -> Result<Arc<PoolRegistry>, EngineError> {
    let generators: Vec<Arc<dyn FactoryGenerator>> = generators.into_iter().map(Arc::from).collect();

    let mut levels: HashSet<EventLevel> = plain_source_levels.clone();
    if has_multilevel {
        levels.extend(ALL_LEVELS);
    }
    if levels.is_empty() {
        levels.insert(EventLevel::None);
    }

    let mut registry = PoolRegistry::new();
    for level in levels {
        let relevant: Vec<Arc<dyn FactoryGenerator>> =
            generators.iter().filter(|g| g.level() == level).cloned().collect();
        let pool = EventPool::new(level, config.pool_capacity, relevant)?;
        registry.insert(Arc::new(pool));
    }
    Ok(Arc::new(registry))
}

/// Builds and validates a [`Topology`] from whatever was registered before
/// `Initialize` (§4.6). Empty of sources and processors is a legal, if
/// useless, topology — `ComponentRegistry` enforces nothing about what gets
/// registered, and neither does this.
pub fn build(config: &EngineConfig, registry: &ComponentRegistry, run_number: u32) -> Result<BuiltTopology, EngineError> {
    let plain_sources = registry.drain_sources();
    let multilevel_sources = registry.drain_multilevel_sources();
    let processors = registry.drain_processors();
    let generators = registry.drain_factory_generators();
    let activations = registry.resolve_auto_activations(&config.auto_activate)?;

    let plain_source_levels: HashSet<EventLevel> = plain_sources.iter().map(|s| s.level()).collect();
    let pools = build_pools(config, generators, !multilevel_sources.is_empty(), &plain_source_levels)?;

    let source_to_map: Arc<Queue<Arc<Event>>> = Arc::new(Queue::new(config.queue_capacity));
    let map_to_tap: Arc<Queue<Arc<Event>>> = Arc::new(Queue::new(config.queue_capacity));

    // Shared across every source feeding `source_to_map`: `event_index` is
    // an ordering property of that queue, not of any one producer, and
    // `TapArrow`'s ordered-processor dispatch keys directly on it.
    let next_event_index = Arc::new(AtomicU64::new(0));

    let mut builder = TopologyBuilder::new(pools.clone());
    let mut source_sinks: Vec<Arc<dyn SourceSink>> = Vec::new();
    let mut source_id = 0usize;

    for source in plain_sources {
        let level = source.level();
        let pool = pools.get(level).cloned().expect("pool for declared source level was just built");
        let name = format!("source_{source_id}");
        let arrow = Arc::new(SourceArrow::new(
            name.clone(),
            source_id,
            run_number,
            vec![source],
            pool,
            source_to_map.clone(),
            config.nevents,
            config.chunksize,
            next_event_index.clone(),
        ));
        source_sinks.push(arrow.clone() as Arc<dyn SourceSink>);
        builder.add_arrow(arrow as Arc<dyn ArrowStep>);
        builder.bind_port("source_to_map", name, PortRole::Output);
        source_id += 1;
    }

    for source in multilevel_sources {
        let name = format!("source_{source_id}");
        let arrow = Arc::new(MultilevelArrow::new(
            name.clone(),
            source_id,
            run_number,
            vec![source],
            pools.clone(),
            source_to_map.clone(),
            config.nevents,
            config.chunksize,
            next_event_index.clone(),
        ));
        source_sinks.push(arrow.clone() as Arc<dyn SourceSink>);
        builder.add_arrow(arrow as Arc<dyn ArrowStep>);
        builder.bind_port("source_to_map", name, PortRole::Output);
        source_id += 1;
    }

    builder.bind_port("source_to_map", "map", PortRole::Input);

    let map_stage = Box::new(AutoActivateStage { activations });
    let map_arrow = Arc::new(MapArrow::new("map", source_to_map.clone(), map_to_tap.clone(), map_stage, config.chunksize));
    builder.add_arrow(map_arrow as Arc<dyn ArrowStep>);
    builder.bind_port("map_to_tap", "map", PortRole::Output);

    builder.bind_port("map_to_tap", "tap", PortRole::Input);
    let tap_arrow = Arc::new(TapArrow::new("tap", map_to_tap.clone(), processors, pools, source_sinks, config.chunksize));
    builder.add_arrow(tap_arrow as Arc<dyn ArrowStep>);

    let topology = builder.build()?;
    let queues = vec![
        ("source_to_map".to_string(), source_to_map),
        ("map_to_tap".to_string(), map_to_tap),
    ];
    Ok(BuiltTopology { topology, queues })
}

#[cfg(test)]
#[path = "topology_builder.test.rs"]
mod tests;
