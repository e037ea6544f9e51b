//! Best-effort stack capture for the status pipe's per-worker report.
//!
//! §9 calls out stack capture as platform-specific and says to abstract it
//! behind a seam that returns `None` where unsupported, rather than compile
//! against a particular unwinder. This crate does not link against
//! `libunwind`/`backtrace` at all; it exposes the seam so an embedding
//! application (or a future platform-specific crate) can provide a real
//! implementation without changing the status-report shape.

/// Returns a human-readable (already-demangled, where available) snapshot
/// of the calling thread's stack, or `None` where no unwinder is wired up.
///
/// The default implementation always returns `None`: this core deliberately
/// carries no platform-specific unwinding dependency.
pub fn capture_stack() -> Option<String> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_capture_is_none() {
        assert_eq!(capture_stack(), None);
    }
}
