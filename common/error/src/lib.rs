//! Shared error classification for the JANA workspace.
//!
//! Every crate defines its own error enum (with `snafu`) for its own
//! failure modes, but every one of those enums implements [`ErrorExt`] so
//! that the engine can classify, log, retry, and report errors uniformly
//! regardless of which component raised them — matching the error handling
//! design's error kinds (Configuration, Component, Resolution, Resource,
//! Lifecycle, External).

mod ext;
mod status_code;

pub use ext::boxed;
pub use ext::ErrorExt;
pub use ext::PlainError;
pub use status_code::StatusCategory;
pub use status_code::StatusCode;
pub use status_code::StatusMeta;
