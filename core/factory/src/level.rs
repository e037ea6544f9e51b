//! The event level hierarchy (§3 `EventLevel`).

use strum::EnumIter;

/// Coarse-to-fine classification of an event's place in the multi-level
/// hierarchy. Ordering is significant: `Run < Subrun < ... < Task < None`
/// defines parent/child relationships — a factory declared at a finer level
/// resolves coarser-level inputs by walking up this ordering via the
/// event's ancestor chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter)]
pub enum EventLevel {
    Run,
    Subrun,
    Timeslice,
    Block,
    PhysicsEvent,
    Subevent,
    Task,
    /// No declared level; used by single-level topologies and tests that
    /// don't exercise the multi-level coordinator.
    None,
}

impl Default for EventLevel {
    /// The finest, "no declared level" tag — the natural default for a
    /// single-level topology that never populates a multi-level hierarchy.
    fn default() -> Self {
        EventLevel::None
    }
}

impl EventLevel {
    pub fn is_coarser_than(self, other: EventLevel) -> bool {
        self < other
    }

    pub fn is_finer_than(self, other: EventLevel) -> bool {
        self > other
    }
}

impl std::fmt::Display for EventLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_matches_spec() {
        assert!(EventLevel::Run < EventLevel::Subrun);
        assert!(EventLevel::Subrun < EventLevel::Timeslice);
        assert!(EventLevel::Timeslice < EventLevel::Block);
        assert!(EventLevel::Block < EventLevel::PhysicsEvent);
        assert!(EventLevel::PhysicsEvent < EventLevel::Subevent);
        assert!(EventLevel::Subevent < EventLevel::Task);
        assert!(EventLevel::Task < EventLevel::None);
    }

    #[test]
    fn coarser_finer_helpers() {
        assert!(EventLevel::Run.is_coarser_than(EventLevel::PhysicsEvent));
        assert!(EventLevel::PhysicsEvent.is_finer_than(EventLevel::Run));
    }
}
