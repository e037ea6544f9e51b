//! Data-on-demand factories and the per-event `FactorySet` that caches them.
//!
//! A factory computes its typed output for an event exactly once, lazily,
//! on first `get`; the result is cached for the rest of the event's life.
//! Factories may themselves call `get` on other factories while computing
//! their own output, which is how a dependency graph gets built up
//! per-event without any global scheduling — `FactorySet` detects cycles in
//! that graph at call time rather than ahead of it.
//!
//! This crate knows nothing about event pooling, queues, or arrows; it is
//! deliberately the lowest layer of the workspace alongside `jana-error`.

mod error;
mod flags;
mod generator;
mod host;
mod key;
mod level;
mod set;
mod status;
mod typed;

pub use error::FactoryError;
pub use flags::FactoryFlags;
pub use generator::generator_for;
pub use generator::FactoryGenerator;
pub use host::FactoryHost;
pub use key::FactoryKey;
pub use key::InputDecl;
pub use level::EventLevel;
pub use set::FactorySet;
pub use status::FactoryStatus;
pub use typed::AnyFactory;
pub use typed::FactoryLogic;
pub use typed::TypedFactory;
