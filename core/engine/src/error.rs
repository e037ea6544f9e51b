//! Errors raised by engine lifecycle operations and the worker loop (§4.6,
//! §7 "Lifecycle" and "External" error kinds).

use jana_error::ErrorExt;
use jana_error::StatusCode;
use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum EngineError {
    #[snafu(display("{operation} invoked while the engine is {state:?}"))]
    InvalidState { operation: &'static str, state: crate::state::EngineState },

    #[snafu(display("building the topology failed: {source}"))]
    Topology { source: jana_arrow::ArrowError },

    #[snafu(display("allocating an event pool failed: {source}"))]
    PoolSetup { source: jana_pool::PoolError },

    #[snafu(display("arrow {arrow:?} raised while executing: {source}"))]
    ArrowRaised { arrow: String, source: jana_arrow::ArrowError },

    #[snafu(display("worker {worker_id} exceeded the {deadline_ms}ms per-step deadline on arrow {arrow:?} ({elapsed_ms}ms elapsed)"))]
    Timeout { worker_id: usize, arrow: String, elapsed_ms: u128, deadline_ms: u128 },

    #[snafu(display("engine received three consecutive interrupt signals"))]
    Interrupted,

    #[snafu(display("status pipe I/O failed: {source}"))]
    StatusPipe { source: std::io::Error },

    #[snafu(display("--auto_activate requested {type_name}:{label:?}, but no registered factory matches"))]
    UnknownAutoActivation { type_name: String, label: String },
}

impl ErrorExt for EngineError {
    fn status_code(&self) -> StatusCode {
        match self {
            EngineError::InvalidState { .. } => StatusCode::InvalidEngineState,
            EngineError::Topology { source } | EngineError::ArrowRaised { source, .. } => source.status_code(),
            EngineError::PoolSetup { source } => source.status_code(),
            EngineError::Timeout { .. } => StatusCode::Timeout,
            EngineError::Interrupted => StatusCode::Interrupt,
            EngineError::StatusPipe { .. } => StatusCode::IoError,
            EngineError::UnknownAutoActivation { .. } => StatusCode::MalformedConfig,
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl From<jana_arrow::ArrowError> for EngineError {
    fn from(source: jana_arrow::ArrowError) -> Self {
        EngineError::Topology { source }
    }
}

impl From<jana_pool::PoolError> for EngineError {
    fn from(source: jana_pool::PoolError) -> Self {
        EngineError::PoolSetup { source }
    }
}

#[cfg(test)]
#[path = "error.test.rs"]
mod tests;
