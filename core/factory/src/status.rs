//! Factory processing status (§3 Factory "status").

/// A factory's status with respect to the event it is currently attached
/// to. `JFactory::GetStatus` in the original keeps `Uninit` distinct from
/// `Unprocessed` (a freshly-constructed factory that has never seen any
/// event, versus one that is attached to an event but hasn't run `Process`
/// yet); this implementation preserves that distinction per §4 of the
/// expanded spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactoryStatus {
    /// Constructed, never attached to an event.
    Uninit,
    /// Attached to an event, `Process` not yet invoked.
    Unprocessed,
    /// `Process` ran to completion for the current event.
    Processed,
    /// `Insert` supplied the output directly; `Process` was never invoked.
    Inserted,
}
