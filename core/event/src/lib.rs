//! The event carrier type and the level hierarchy it is built against.
//!
//! `Event` is the object that flows through the arrow topology: it carries
//! identifiers, a level tag, and a `FactorySet` that every factory
//! invocation for this event shares. This crate depends on `jana-factory`
//! (not the reverse) so that the factory/cycle-detection machinery stays
//! free of any knowledge of event pooling, queues, or arrows; `Event`
//! implements `jana_factory::FactoryHost` so factory bodies can resolve
//! both same-level and ancestor-level inputs through one interface.

mod event;
mod failure;

pub use event::Event;
pub use event::EventBuilder;
pub use failure::EventFailure;
pub use jana_factory::EventLevel;
