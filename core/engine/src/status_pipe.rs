//! Status FIFO writer (§6 "Status pipe").
//!
//! When a `status_pipe_path` is configured, the engine's monitor thread
//! creates a named FIFO there (if it doesn't already exist) and, on
//! receipt of `SIGUSR1`, serializes a [`jana_otel::StatusReport`] and
//! writes it. Opening a FIFO for writing blocks until some reader opens
//! the other end, which is fine for an operator running `cat` on the pipe
//! but would wedge the monitor thread forever if nobody is listening —
//! so the open uses `O_NONBLOCK` and a write attempt with no reader
//! present is simply skipped rather than retried.

use std::ffi::CString;
use std::fs::OpenOptions;
use std::io::Write;
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;

/// Creates the FIFO at `path` if it does not already exist. Idempotent.
pub fn ensure_fifo(path: &Path) -> std::io::Result<()> {
    if path.exists() {
        return Ok(());
    }
    let c_path = CString::new(path.as_os_str().as_encoded_bytes())
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidInput, err))?;
    let result = unsafe { libc::mkfifo(c_path.as_ptr(), 0o644) };
    if result != 0 {
        let err = std::io::Error::last_os_error();
        if err.kind() != std::io::ErrorKind::AlreadyExists {
            return Err(err);
        }
    }
    Ok(())
}

/// Writes `body` to the FIFO at `path` if a reader is currently attached;
/// silently does nothing (not an error) if opening would block, since that
/// just means nobody asked for a report this round.
pub fn try_write(path: &Path, body: &str) -> std::io::Result<()> {
    let opened = OpenOptions::new().write(true).custom_flags(libc::O_NONBLOCK).open(path);
    let mut file = match opened {
        Ok(file) => file,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound || is_no_reader(&err) => return Ok(()),
        Err(err) => return Err(err),
    };
    file.write_all(body.as_bytes())
}

fn is_no_reader(err: &std::io::Error) -> bool {
    matches!(err.raw_os_error(), Some(libc::ENXIO))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_fifo_creates_a_fifo_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("status.fifo");
        ensure_fifo(&path).expect("creates fifo");
        assert!(path.exists());
        ensure_fifo(&path).expect("idempotent");
    }

    #[test]
    fn write_with_no_reader_does_not_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("status.fifo");
        ensure_fifo(&path).expect("creates fifo");
        try_write(&path, "{}").expect("no reader is not an error");
    }
}
