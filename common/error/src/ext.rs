//! [`ErrorExt`]: the trait every crate-local error enum implements so that
//! the engine can classify, retry, and report failures uniformly regardless
//! of which crate raised them.

use crate::StatusCode;
use std::fmt;

/// Extension trait implemented by every error type that crosses a component
/// boundary (factory `Process`, source `Emit`, processor `Process`, engine
/// lifecycle calls).
pub trait ErrorExt: std::error::Error {
    /// The status code classifying this error.
    fn status_code(&self) -> StatusCode;

    /// Whether the operation that produced this error may succeed if retried.
    fn is_retryable(&self) -> bool {
        self.status_code().is_retryable()
    }

    /// A message safe to show to the end user. Internal-category errors
    /// collapse to a generic message plus the status code so that
    /// implementation details never leak into the status pipe or stderr.
    fn output_msg(&self) -> String {
        match self.status_code() {
            StatusCode::Internal | StatusCode::Unknown => {
                format!("Internal error: {}", self.status_code() as i32)
            }
            _ => self.to_string(),
        }
    }

    /// Upcast for error-chain inspection.
    fn as_any(&self) -> &dyn std::any::Any;
}

/// A minimal concrete [`ErrorExt`] implementation for wrapping a plain
/// message, used at plugin-load and CLI-parsing boundaries where there is no
/// richer error enum to construct.
#[derive(Debug)]
pub struct PlainError {
    message: String,
    status_code: StatusCode,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl PlainError {
    pub fn new(message: impl Into<String>, status_code: StatusCode) -> Self {
        Self {
            message: message.into(),
            status_code,
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        status_code: StatusCode,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            status_code,
            source: Some(Box::new(source)),
        }
    }
}

impl fmt::Display for PlainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for PlainError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl ErrorExt for PlainError {
    fn status_code(&self) -> StatusCode {
        self.status_code
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Wraps any `std::error::Error` implementor (e.g. `std::io::Error` from the
/// status pipe) into a [`PlainError`] carrying the given status code.
pub fn boxed(
    source: impl std::error::Error + Send + Sync + 'static,
    status_code: StatusCode,
) -> PlainError {
    let message = source.to_string();
    PlainError::with_source(message, status_code, source)
}

#[cfg(test)]
#[path = "ext.test.rs"]
mod tests;
