//! The seam between a factory's `Process` body and the event that owns it.
//!
//! `FactoryHost` is deliberately small and object-safe: it exposes just
//! enough of an event (run/event number, level, its own factory set, and a
//! way to reach a coarser-level ancestor's factory set) for
//! [`crate::FactorySet::get`] to resolve inputs, without this crate naming
//! the concrete `Event` type from `jana-event` — `jana-event` depends on
//! `jana-factory` and implements this trait for its `Event`, not the other
//! way around, which keeps the factory/cycle-detection machinery free of
//! any knowledge of event pooling or the multi-level coordinator.

use crate::level::EventLevel;
use crate::set::FactorySet;

/// Implemented by the event type that owns a [`FactorySet`], so that a
/// factory's `Process` body can resolve both same-level and ancestor-level
/// inputs through a uniform interface.
pub trait FactoryHost: Send + Sync {
    fn run_number(&self) -> u32;
    fn event_number(&self) -> u64;
    fn level(&self) -> EventLevel;
    fn factory_set(&self) -> &FactorySet;
    /// Returns the nearest ancestor at exactly `level`, or `None` if no
    /// such ancestor exists in this event's parent chain.
    fn ancestor(&self, level: EventLevel) -> Option<&dyn FactoryHost>;
}
