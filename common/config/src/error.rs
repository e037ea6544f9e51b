//! Errors raised while loading parameter files, wiring files, or CLI args.

use jana_error::ErrorExt;
use jana_error::StatusCode;
use snafu::Snafu;
use std::path::PathBuf;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ConfigError {
    #[snafu(display("failed to read {path}: {source}"))]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("malformed parameter line {line_no} in {path}: {line:?}"))]
    MalformedParameterLine {
        path: PathBuf,
        line_no: usize,
        line: String,
    },

    #[snafu(display("malformed -P override {raw:?}: expected key=value"))]
    MalformedOverride { raw: String },

    #[snafu(display("failed to parse wiring file {path}: {source}"))]
    MalformedWiring {
        path: PathBuf,
        source: serde_path_to_error::Error<serde_json::Error>,
    },

    #[snafu(display(
        "duplicate factory prefix {prefix:?} within wiring layer {layer}"
    ))]
    DuplicatePrefixInLayer { layer: String, prefix: String },

    #[snafu(display(
        "plugin loading is not implemented by this core (requested {what:?})"
    ))]
    PluginLoadingNotImplemented { what: String },
}

impl ErrorExt for ConfigError {
    fn status_code(&self) -> StatusCode {
        match self {
            ConfigError::Read { .. } => StatusCode::IoError,
            ConfigError::MalformedParameterLine { .. } | ConfigError::MalformedOverride { .. } => {
                StatusCode::MalformedConfig
            }
            ConfigError::MalformedWiring { .. } => StatusCode::MalformedConfig,
            ConfigError::DuplicatePrefixInLayer { .. } => StatusCode::DuplicateWiringPrefix,
            ConfigError::PluginLoadingNotImplemented { .. } => {
                StatusCode::PluginLoadingNotImplemented
            }
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
