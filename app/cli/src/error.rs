//! The CLI's own error type, wrapping whichever layer actually failed so
//! `main` has a single [`jana_error::ErrorExt`] to read an exit code from
//! (§6 "Exit codes").

use jana_error::ErrorExt;
use jana_error::StatusCode;
use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CliError {
    #[snafu(display("{source}"))]
    Config { source: jana_config::ConfigError },

    #[snafu(display("{source}"))]
    Engine { source: jana_engine::EngineError },

    #[snafu(display("failed to read {path}: {source}"))]
    Io { path: String, source: std::io::Error },
}

impl ErrorExt for CliError {
    fn status_code(&self) -> StatusCode {
        match self {
            CliError::Config { source } => source.status_code(),
            CliError::Engine { source } => source.status_code(),
            CliError::Io { .. } => StatusCode::IoError,
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

impl From<jana_config::ConfigError> for CliError {
    fn from(source: jana_config::ConfigError) -> Self {
        CliError::Config { source }
    }
}

impl From<jana_engine::EngineError> for CliError {
    fn from(source: jana_engine::EngineError) -> Self {
        CliError::Engine { source }
    }
}
