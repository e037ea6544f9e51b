//! [`EngineState`]: the lifecycle states an [`crate::Engine`] moves through
//! (§4.6).
//!
//! `Unopened -> Initialized -> Running <-> Paused -> Finishing -> Finished`.
//! `Scale` is a no-op on this enum — it changes worker count without
//! changing state.

/// One point in the engine's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Unopened,
    Initialized,
    Running,
    Paused,
    Finishing,
    Finished,
}

impl EngineState {
    pub fn can_initialize(self) -> bool {
        matches!(self, EngineState::Unopened)
    }

    pub fn can_run(self) -> bool {
        matches!(self, EngineState::Initialized | EngineState::Paused | EngineState::Running)
    }

    pub fn can_pause(self) -> bool {
        matches!(self, EngineState::Running)
    }

    pub fn can_resume(self) -> bool {
        matches!(self, EngineState::Paused)
    }

    pub fn can_scale(self) -> bool {
        matches!(self, EngineState::Running | EngineState::Paused)
    }

    pub fn can_stop(self) -> bool {
        matches!(self, EngineState::Running | EngineState::Paused | EngineState::Finishing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unopened_only_allows_initialize() {
        assert!(EngineState::Unopened.can_initialize());
        assert!(!EngineState::Unopened.can_run());
        assert!(!EngineState::Unopened.can_pause());
        assert!(!EngineState::Unopened.can_stop());
    }

    #[test]
    fn running_allows_pause_scale_and_stop_but_not_reinitialize() {
        assert!(!EngineState::Running.can_initialize());
        assert!(EngineState::Running.can_pause());
        assert!(EngineState::Running.can_scale());
        assert!(EngineState::Running.can_stop());
    }

    #[test]
    fn paused_allows_resume_and_scale() {
        assert!(EngineState::Paused.can_resume());
        assert!(EngineState::Paused.can_scale());
        assert!(EngineState::Paused.can_run());
    }

    #[test]
    fn finished_allows_nothing() {
        assert!(!EngineState::Finished.can_initialize());
        assert!(!EngineState::Finished.can_run());
        assert!(!EngineState::Finished.can_pause());
        assert!(!EngineState::Finished.can_scale());
        assert!(!EngineState::Finished.can_stop());
    }
}
