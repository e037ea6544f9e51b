//! Errors raised while executing an arrow step (§4.4, §7 "Component" and
//! "Lifecycle" error kinds).

use jana_error::ErrorExt;
use jana_error::StatusCode;
use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ArrowError {
    #[snafu(display("source {name:?} Emit raised: {message}"))]
    SourceRaised { name: String, message: String },

    #[snafu(display("processor {name:?} Process raised: {message}"))]
    ProcessorRaised { name: String, message: String },

    #[snafu(display("factory stage raised: {source}"))]
    FactoryStage { source: jana_factory::FactoryError },

    #[snafu(display("arrow {name:?} invoked in state {state:?}, which disallows it"))]
    InvalidArrowState { name: String, state: String },

    #[snafu(display("event pool for level {level} was not registered with this topology"))]
    MissingPool { level: jana_factory::EventLevel },

    #[snafu(display("queue {queue:?} has no bound producer or no bound consumer"))]
    OrphanPort { queue: String },

    #[snafu(display("cycle among parallel arrows: {chain}"))]
    ParallelCycle { chain: String },
}

impl ErrorExt for ArrowError {
    fn status_code(&self) -> StatusCode {
        match self {
            ArrowError::SourceRaised { .. } | ArrowError::ProcessorRaised { .. } => {
                StatusCode::ComponentRaised
            }
            ArrowError::FactoryStage { source } => source.status_code(),
            ArrowError::InvalidArrowState { .. } => StatusCode::InvalidEngineState,
            ArrowError::MissingPool { .. } => StatusCode::InvalidEngineState,
            ArrowError::OrphanPort { .. } | ArrowError::ParallelCycle { .. } => {
                StatusCode::InvalidEngineState
            }
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl From<jana_factory::FactoryError> for ArrowError {
    fn from(source: jana_factory::FactoryError) -> Self {
        ArrowError::FactoryStage { source }
    }
}
