//! Unified status codes for error classification.
//!
//! Status code format: XX_YYY (5-digit)
//! - XX = Category (00-99)
//! - YYY = Code within category (000-999)
//!
//! Category layout follows the error-kind taxonomy of the engine's error
//! handling design: Configuration, Component, Resolution, Resource,
//! Lifecycle, External, plus a generic Common/IO bucket for everything else.

use strum::AsRefStr;
use strum::EnumIter;
use strum::FromRepr;

/// Status code metadata.
#[derive(Debug, Clone, Copy)]
pub struct StatusMeta {
    pub retryable: bool,
    pub log_error: bool,
    pub category: StatusCategory,
}

/// Status code category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCategory {
    /// Success (00_xxx)
    Success,
    /// Common/internal errors (01_xxx)
    Common,
    /// IO/storage errors (02_xxx)
    Io,
    /// Configuration errors: missing/ambiguous wiring, unknown source type,
    /// duplicate factory prefix (10_xxx)
    Configuration,
    /// Component errors: user Init/Process/Finalize raised (11_xxx)
    Component,
    /// Resolution errors: factory input not found, wrong level, cycle (12_xxx)
    Resolution,
    /// Resource errors: pool exhausted, queue persistently full (13_xxx)
    Resource,
    /// Lifecycle errors: operation invoked in a disallowed engine state (14_xxx)
    Lifecycle,
    /// External errors: signals, timeouts (15_xxx)
    External,
}

macro_rules! define_status_codes {
    ($(
        $(#[$attr:meta])*
        $name:ident = $value:expr => {
            retryable: $retry:expr,
            log_error: $log:expr,
            category: $cat:ident $(,)?
        }
    ),* $(,)?) => {
        /// Status codes for error classification.
        ///
        /// Format: XX_YYY (5-digit)
        #[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumIter, FromRepr)]
        #[repr(i32)]
        pub enum StatusCode {
            $($(#[$attr])* $name = $value,)*
        }

        impl StatusCode {
            /// Returns the metadata for this status code.
            pub const fn meta(&self) -> StatusMeta {
                match self {
                    $(Self::$name => StatusMeta {
                        retryable: $retry,
                        log_error: $log,
                        category: StatusCategory::$cat,
                    },)*
                }
            }

            /// Returns the string name of this status code.
            pub const fn name(&self) -> &'static str {
                match self {
                    $(Self::$name => stringify!($name),)*
                }
            }
        }

        const _: () = {
            const CODES: &[i32] = &[$($value),*];
            const fn check_unique() {
                let mut i = 0;
                while i < CODES.len() {
                    let mut j = i + 1;
                    while j < CODES.len() {
                        if CODES[i] == CODES[j] {
                            panic!("Duplicate status code value detected");
                        }
                        j += 1;
                    }
                    i += 1;
                }
            }
            check_unique();
        };
    };
}

define_status_codes! {
    // ====== Success (00_xxx) ======
    /// Operation succeeded.
    Success = 00_000 => { retryable: false, log_error: false, category: Success },

    // ====== Common errors (01_xxx) ======
    /// Unknown error.
    Unknown = 01_000 => { retryable: false, log_error: true, category: Common },
    /// Internal error, unexpected bug.
    Internal = 01_001 => { retryable: false, log_error: true, category: Common },
    /// Unsupported operation.
    Unsupported = 01_002 => { retryable: false, log_error: false, category: Common },
    /// Invalid arguments.
    InvalidArguments = 01_003 => { retryable: false, log_error: false, category: Common },

    // ====== IO errors (02_xxx) ======
    /// IO error (status pipe, parameter file, wiring file).
    IoError = 02_000 => { retryable: false, log_error: false, category: Io },
    /// File not found.
    FileNotFound = 02_001 => { retryable: false, log_error: false, category: Io },

    // ====== Configuration errors (10_xxx) ======
    /// Missing or ambiguous wiring entry for a factory prefix.
    AmbiguousWiring = 10_000 => { retryable: false, log_error: false, category: Configuration },
    /// Duplicate factory prefix within a wiring layer, or across layers.
    DuplicateWiringPrefix = 10_001 => { retryable: false, log_error: false, category: Configuration },
    /// Unknown event source type name.
    UnknownSourceType = 10_002 => { retryable: false, log_error: false, category: Configuration },
    /// Malformed parameter or wiring file.
    MalformedConfig = 10_003 => { retryable: false, log_error: false, category: Configuration },
    /// Plugin/shared-object loading requested but not implemented by this core.
    PluginLoadingNotImplemented = 10_004 => { retryable: false, log_error: false, category: Configuration },

    // ====== Component errors (11_xxx) ======
    /// A user-supplied Init/Process/Finalize callback raised.
    ComponentRaised = 11_000 => { retryable: false, log_error: true, category: Component },

    // ====== Resolution errors (12_xxx) ======
    /// A declared factory input could not be found on the event or its ancestors.
    UnresolvedInputLevel = 12_000 => { retryable: false, log_error: false, category: Resolution },
    /// A cycle was detected in the factory dependency graph.
    CycleDetected = 12_001 => { retryable: false, log_error: false, category: Resolution },

    // ====== Resource errors (13_xxx) ======
    /// A pool could not allocate enough events at startup.
    PoolExhausted = 13_000 => { retryable: false, log_error: true, category: Resource },
    /// A queue has been persistently full (downstream stall); scheduling signal, not fatal.
    QueueFull = 13_001 => { retryable: true, log_error: false, category: Resource },
    /// A queue or pool is empty; scheduling signal, not fatal.
    Empty = 13_002 => { retryable: true, log_error: false, category: Resource },

    // ====== Lifecycle errors (14_xxx) ======
    /// An engine operation was invoked in a state that disallows it.
    InvalidEngineState = 14_000 => { retryable: false, log_error: false, category: Lifecycle },

    // ====== External errors (15_xxx) ======
    /// The engine received an interrupt signal.
    Interrupt = 15_000 => { retryable: false, log_error: false, category: External },
    /// A per-event deadline was exceeded.
    Timeout = 15_001 => { retryable: false, log_error: true, category: External },
}

impl StatusCode {
    /// Maps a status code to the process exit code described for the CLI surface:
    /// `0` success, `1` unhandled exception, `2` timeout, `139` segfault.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Timeout => 2,
            _ => 1,
        }
    }

    /// Whether `value` is the numeric code for [`StatusCode::Success`].
    pub fn is_success(value: i32) -> bool {
        value == Self::Success as i32
    }

    pub fn is_retryable(&self) -> bool {
        self.meta().retryable
    }

    pub fn should_log_error(&self) -> bool {
        self.meta().log_error
    }

    pub fn category(&self) -> StatusCategory {
        self.meta().category
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
#[path = "status_code.test.rs"]
mod tests;
