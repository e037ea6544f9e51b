//! Arrow kinds and the topology graph that binds them together (§3
//! Arrow/Topology, §4.4, §4.8 multi-level forwarding).
//!
//! An arrow is the unit the scheduler assigns to workers: it owns its
//! input/output ports (queues and/or pools) and exposes one bounded
//! `execute` step through the [`ArrowStep`] trait object, so
//! `jana-scheduler`/`jana-engine` never need to match on concrete arrow
//! type.

mod base;
mod error;
mod kind;
mod map;
mod multilevel;
mod source;
mod tap;
mod topology;

pub use base::ArrowBase;
pub use error::ArrowError;
pub use kind::ArrowKind;
pub use kind::ArrowState;
pub use kind::StepOutcome;
pub use map::MapArrow;
pub use map::MapStage;
pub use multilevel::MultilevelArrow;
pub use multilevel::MultilevelSource;
pub use source::EmitOutcome;
pub use source::EventSource;
pub use source::SourceArrow;
pub use source::SourceSink;
pub use tap::ClosureProcessor;
pub use tap::Processor;
pub use tap::ProcessorMode;
pub use tap::TapArrow;
pub use topology::ArrowStep;
pub use topology::PortRole;
pub use topology::Topology;
pub use topology::TopologyBuilder;
