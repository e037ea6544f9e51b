//! Factory behavior flags (§3 Factory "Flags").

/// Behavior flags a factory declares at registration time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FactoryFlags {
    /// Survives an event recycle instead of being reset to `Unprocessed`.
    pub persistent: bool,
    /// The factory's outputs are references into storage it does not own
    /// (e.g. borrowed from an input factory); the pool must not attempt to
    /// free them independently.
    pub not_object_owner: bool,
    /// The factory writes directly into the event's output stream as a
    /// side effect of `Process`, in addition to caching its return value.
    pub write_to_output: bool,
}

impl FactoryFlags {
    pub const fn persistent() -> Self {
        Self {
            persistent: true,
            ..Self::new()
        }
    }

    pub const fn new() -> Self {
        Self {
            persistent: false,
            not_object_owner: false,
            write_to_output: false,
        }
    }
}
