//! [`Topology`]: the arrow graph plus its port bindings (§3 Topology).
//!
//! "Invariant: the graph has no orphan ports and no cycles among parallel
//! arrows." [`TopologyBuilder`] collects arrows and the queue bindings
//! between them and enforces both at `build()` time, before the engine
//! ever starts a worker against the graph.

use crate::base::ArrowBase;
use crate::error::ArrowError;
use crate::error::OrphanPortSnafu;
use crate::error::ParallelCycleSnafu;
use crate::kind::ArrowKind;
use crate::kind::ArrowState;
use crate::kind::StepOutcome;
use crate::map::MapArrow;
use crate::multilevel::MultilevelArrow;
use crate::source::SourceArrow;
use crate::tap::TapArrow;
use jana_pool::PoolRegistry;
use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;

/// Object-safe seam every concrete arrow kind implements, so the scheduler
/// and engine can drive a topology without matching on `ArrowKind`
/// themselves (§9's "replace `dynamic_cast`-style polymorphism" design
/// note, realized here as ordinary trait-object dispatch).
pub trait ArrowStep: Send + Sync {
    fn base(&self) -> &ArrowBase;

    fn name(&self) -> &str {
        self.base().name()
    }

    fn kind(&self) -> ArrowKind {
        self.base().kind()
    }

    fn state(&self) -> ArrowState {
        self.base().state()
    }

    fn is_parallel(&self) -> bool {
        self.base().is_parallel()
    }

    fn try_enter(&self) -> bool {
        self.base().try_enter()
    }

    fn exit(&self) {
        self.base().exit()
    }

    /// Workers currently executing this arrow's `execute` step, for the
    /// status report's topology table (§6 "Status pipe").
    fn active_workers(&self) -> usize {
        self.base().active_workers()
    }

    fn metrics(&self) -> &jana_otel::ArrowMetrics {
        self.base().metrics()
    }

    /// Transitions the arrow from `Unopened` to `Running`, running any
    /// per-arrow open hooks (a source opening its first configured
    /// `EventSource`, a tap running every processor's `init`).
    fn open(&self) -> Result<(), ArrowError>;

    /// Runs one bounded unit of work (§4.6 `arrow.execute` contract).
    fn execute(&self) -> Result<StepOutcome, ArrowError>;

    /// Runs per-arrow finalization (a tap's processors' `Finalize`).
    /// Default no-op: sources and maps have no separate close step beyond
    /// what `execute` already does when their input is exhausted.
    fn close(&self) -> Result<(), ArrowError> {
        Ok(())
    }
}

impl ArrowStep for SourceArrow {
    fn base(&self) -> &ArrowBase {
        SourceArrow::base(self)
    }

    fn open(&self) -> Result<(), ArrowError> {
        self.opens()
    }

    fn execute(&self) -> Result<StepOutcome, ArrowError> {
        SourceArrow::execute(self)
    }

    fn close(&self) -> Result<(), ArrowError> {
        if self.state() != ArrowState::Finished {
            self.force_finalize()?;
        }
        Ok(())
    }
}

impl ArrowStep for MultilevelArrow {
    fn base(&self) -> &ArrowBase {
        MultilevelArrow::base(self)
    }

    fn open(&self) -> Result<(), ArrowError> {
        self.opens()
    }

    fn execute(&self) -> Result<StepOutcome, ArrowError> {
        MultilevelArrow::execute(self)
    }

    fn close(&self) -> Result<(), ArrowError> {
        if self.state() != ArrowState::Finished {
            self.force_finalize()?;
        }
        Ok(())
    }
}

impl ArrowStep for MapArrow {
    fn base(&self) -> &ArrowBase {
        MapArrow::base(self)
    }

    fn open(&self) -> Result<(), ArrowError> {
        MapArrow::open(self);
        Ok(())
    }

    fn execute(&self) -> Result<StepOutcome, ArrowError> {
        MapArrow::execute(self)
    }
}

impl ArrowStep for TapArrow {
    fn base(&self) -> &ArrowBase {
        TapArrow::base(self)
    }

    fn open(&self) -> Result<(), ArrowError> {
        TapArrow::open(self)
    }

    fn execute(&self) -> Result<StepOutcome, ArrowError> {
        TapArrow::execute(self)
    }

    fn close(&self) -> Result<(), ArrowError> {
        TapArrow::close(self)
    }
}

/// Which end of a queue an arrow is bound to, for port-validation purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortRole {
    Output,
    Input,
}

#[derive(Default)]
struct QueueBinding {
    producers: Vec<String>,
    consumers: Vec<String>,
}

/// Collects arrows and their queue bindings, validating the Topology
/// invariant before producing an immutable [`Topology`].
pub struct TopologyBuilder {
    arrows: Vec<Arc<dyn ArrowStep>>,
    queues: HashMap<String, QueueBinding>,
    pools: Arc<PoolRegistry>,
}

impl TopologyBuilder {
    pub fn new(pools: Arc<PoolRegistry>) -> Self {
        Self { arrows: Vec::new(), queues: HashMap::new(), pools }
    }

    pub fn add_arrow(&mut self, arrow: Arc<dyn ArrowStep>) -> &mut Self {
        self.arrows.push(arrow);
        self
    }

    /// Records that `arrow_name` is bound to `queue_label` in the given
    /// role. A queue typically has one producer and one-or-more consumers
    /// (a `Split`), or several producers and one consumer (a `Merge`).
    pub fn bind_port(&mut self, queue_label: impl Into<String>, arrow_name: impl Into<String>, role: PortRole) -> &mut Self {
        let binding = self.queues.entry(queue_label.into()).or_default();
        let arrow_name = arrow_name.into();
        match role {
            PortRole::Output => binding.producers.push(arrow_name),
            PortRole::Input => binding.consumers.push(arrow_name),
        }
        self
    }

    pub fn build(self) -> Result<Topology, ArrowError> {
        for (queue, binding) in &self.queues {
            if binding.producers.is_empty() || binding.consumers.is_empty() {
                return OrphanPortSnafu { queue: queue.clone() }.fail();
            }
        }

        let parallel: HashSet<&str> =
            self.arrows.iter().filter(|a| a.is_parallel()).map(|a| a.name()).collect();

        let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
        for binding in self.queues.values() {
            for producer in &binding.producers {
                if !parallel.contains(producer.as_str()) {
                    continue;
                }
                for consumer in &binding.consumers {
                    if parallel.contains(consumer.as_str()) {
                        adjacency.entry(producer.as_str()).or_default().push(consumer.as_str());
                    }
                }
            }
        }

        detect_cycle(&adjacency)?;

        Ok(Topology { arrows: self.arrows, pools: self.pools })
    }
}

fn detect_cycle(adjacency: &HashMap<&str, Vec<&str>>) -> Result<(), ArrowError> {
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Mark {
        Visiting,
        Done,
    }

    fn visit<'a>(
        node: &'a str,
        adjacency: &HashMap<&'a str, Vec<&'a str>>,
        marks: &mut HashMap<&'a str, Mark>,
        stack: &mut Vec<&'a str>,
    ) -> Result<(), ArrowError> {
        stack.push(node);
        marks.insert(node, Mark::Visiting);
        if let Some(neighbors) = adjacency.get(node) {
            for &next in neighbors {
                match marks.get(next) {
                    Some(Mark::Visiting) => {
                        let mut chain: Vec<&str> = stack.clone();
                        chain.push(next);
                        return ParallelCycleSnafu { chain: chain.join(" -> ") }.fail();
                    }
                    Some(Mark::Done) => continue,
                    None => visit(next, adjacency, marks, stack)?,
                }
            }
        }
        stack.pop();
        marks.insert(node, Mark::Done);
        Ok(())
    }

    let mut marks = HashMap::new();
    let mut stack = Vec::new();
    for &node in adjacency.keys() {
        if !marks.contains_key(node) {
            visit(node, adjacency, &mut marks, &mut stack)?;
        }
    }
    Ok(())
}

/// An assembled, validated arrow graph ready for a scheduler to drive.
pub struct Topology {
    arrows: Vec<Arc<dyn ArrowStep>>,
    pools: Arc<PoolRegistry>,
}

impl Topology {
    pub fn arrows(&self) -> &[Arc<dyn ArrowStep>] {
        &self.arrows
    }

    pub fn pools(&self) -> &Arc<PoolRegistry> {
        &self.pools
    }

    pub fn open_all(&self) -> Result<(), ArrowError> {
        for arrow in &self.arrows {
            arrow.open()?;
        }
        Ok(())
    }

    pub fn close_all(&self) -> Result<(), ArrowError> {
        for arrow in &self.arrows {
            arrow.close()?;
        }
        Ok(())
    }

    /// An arrow is done for the run once it's in `ArrowState::Finished`;
    /// the engine uses this to decide when `Run` should transition to
    /// `Finishing` (§4.6).
    pub fn all_finished(&self) -> bool {
        self.arrows.iter().all(|a| a.state() == ArrowState::Finished)
    }
}

#[cfg(test)]
#[path = "topology.test.rs"]
mod tests;
