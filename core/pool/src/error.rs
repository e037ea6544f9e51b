//! Errors raised by event pools (§7 "Resource" and "Lifecycle" error kinds).

use jana_error::ErrorExt;
use jana_error::StatusCode;
use jana_factory::EventLevel;
use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum PoolError {
    #[snafu(display("event pool for level {level} could not allocate {requested} events at startup"))]
    Exhausted {
        level: EventLevel,
        requested: usize,
    },

    #[snafu(display("cannot downscale event pool for level {level} while the engine is running"))]
    DownscaleForbidden { level: EventLevel },
}

impl ErrorExt for PoolError {
    fn status_code(&self) -> StatusCode {
        match self {
            PoolError::Exhausted { .. } => StatusCode::PoolExhausted,
            PoolError::DownscaleForbidden { .. } => StatusCode::InvalidEngineState,
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
