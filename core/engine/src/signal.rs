//! Process-wide signal bookkeeping (§4.6 "Signals and timeouts", §6 "Status
//! pipe").
//!
//! Handlers only ever touch plain atomics — nothing allocates or locks
//! inside `extern "C"` handler bodies, which is the only thing a POSIX
//! signal handler is guaranteed safe to do. The engine's monitor thread
//! polls these atomics on its own schedule rather than being woken by the
//! signal itself.

use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

static SIGINT_COUNT: AtomicUsize = AtomicUsize::new(0);
static STATUS_REQUESTED: AtomicBool = AtomicBool::new(false);
static INSTALLED: AtomicBool = AtomicBool::new(false);

extern "C" fn on_sigint(_: libc::c_int) {
    SIGINT_COUNT.fetch_add(1, Ordering::SeqCst);
}

extern "C" fn on_sigusr1(_: libc::c_int) {
    STATUS_REQUESTED.store(true, Ordering::SeqCst);
}

/// Process-wide interrupt/status-request counters, installed once per
/// process. Three consecutive `SIGINT`s escalate to an immediate
/// [`crate::Engine::quit`]; `SIGUSR1` requests a [`jana_otel::StatusReport`]
/// write to the configured status FIFO.
pub struct SignalState;

impl SignalState {
    /// Installs the `SIGINT`/`SIGUSR1` handlers. Safe to call more than
    /// once (only the first call has an effect); a process embedding
    /// `jana-engine` inside a larger signal-handling scheme should skip
    /// this and drive [`SignalState`]'s counters itself instead.
    pub fn install() {
        if INSTALLED.swap(true, Ordering::SeqCst) {
            return;
        }
        unsafe {
            libc::signal(libc::SIGINT, on_sigint as libc::sighandler_t);
            libc::signal(libc::SIGUSR1, on_sigusr1 as libc::sighandler_t);
        }
    }

    pub fn sigint_count() -> usize {
        SIGINT_COUNT.load(Ordering::SeqCst)
    }

    pub fn reset_sigint_count() {
        SIGINT_COUNT.store(0, Ordering::SeqCst);
    }

    /// Consumes a pending status request, if any arrived since the last
    /// call.
    pub fn take_status_request() -> bool {
        STATUS_REQUESTED.swap(false, Ordering::SeqCst)
    }

    #[cfg(test)]
    pub(crate) fn simulate_sigint() {
        on_sigint(libc::SIGINT);
    }

    #[cfg(test)]
    pub(crate) fn simulate_status_request() {
        on_sigusr1(libc::SIGUSR1);
    }
}

#[cfg(test)]
#[path = "signal.test.rs"]
mod tests;
