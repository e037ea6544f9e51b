//! Errors raised by the factory / data-on-demand subsystem (§4.3, §7
//! "Resolution" error kind).

use crate::level::EventLevel;
use jana_error::ErrorExt;
use jana_error::StatusCode;
use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum FactoryError {
    #[snafu(display(
        "no factory registered for type {type_name:?} label {label:?}"
    ))]
    NotRegistered { type_name: &'static str, label: String },

    #[snafu(display(
        "input {type_name:?} label {label:?} at level {level} could not be resolved via the ancestor chain"
    ))]
    UnresolvedInputLevel {
        type_name: &'static str,
        label: String,
        level: EventLevel,
    },

    #[snafu(display("cycle detected in factory dependency graph: {chain}"))]
    CycleDetected { chain: String },

    #[snafu(display("factory {type_name:?} label {label:?} Process raised: {message}"))]
    ProcessRaised {
        type_name: &'static str,
        label: String,
        message: String,
    },

    #[snafu(display(
        "factory {type_name:?} label {label:?} was invoked at level {actual} but is declared for level {declared}"
    ))]
    WrongLevel {
        type_name: &'static str,
        label: String,
        declared: EventLevel,
        actual: EventLevel,
    },
}

impl ErrorExt for FactoryError {
    fn status_code(&self) -> StatusCode {
        match self {
            FactoryError::NotRegistered { .. } | FactoryError::UnresolvedInputLevel { .. } => {
                StatusCode::UnresolvedInputLevel
            }
            FactoryError::CycleDetected { .. } => StatusCode::CycleDetected,
            FactoryError::ProcessRaised { .. } => StatusCode::ComponentRaised,
            FactoryError::WrongLevel { .. } => StatusCode::UnresolvedInputLevel,
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
