//! Arrow identity and lifecycle state (§3 Arrow).

use std::fmt;

/// The stage kind an arrow plays in the topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowKind {
    Source,
    Map,
    Tap,
    Split,
    Merge,
    Multilevel,
}

impl fmt::Display for ArrowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// An arrow's lifecycle state, driven by the execution engine (§3, §4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowState {
    Unopened,
    Running,
    Paused,
    Finished,
}

impl fmt::Display for ArrowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// The outcome of one `arrow.execute` step (§4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The arrow has more work ready right now; the scheduler should
    /// prefer reassigning it to the same worker (§4.5 policy 1).
    KeepGoing,
    /// No work was available this step (input empty or output full); the
    /// caller should back off and try other arrows.
    ComeBackLater,
    /// The arrow has completed all its work and transitioned to
    /// `ArrowState::Finished`.
    Finished,
}
