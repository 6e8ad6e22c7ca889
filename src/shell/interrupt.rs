//! SIGINT handling.
//!
//! The handler only records that an interrupt arrived. The running child
//! shares our process group and receives the same signal, so the current
//! step fails on its own; the orchestrator notices the flag before the next
//! step and unwinds normally, letting destructors remove the scratch
//! directory and close the run log.

use std::sync::atomic::{AtomicBool, Ordering};

static INTERRUPTED: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
extern "C" fn handle_sigint(_signal: libc::c_int) {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

/// Install the SIGINT handler. Safe to call more than once.
pub fn install_handler() {
    #[cfg(unix)]
    {
        let handler = handle_sigint as extern "C" fn(libc::c_int);
        // SAFETY: the handler only performs an atomic store, which is
        // async-signal-safe.
        let previous = unsafe { libc::signal(libc::SIGINT, handler as libc::sighandler_t) };
        if previous == libc::SIG_ERR {
            tracing::warn!("Could not install SIGINT handler");
        }
    }
}

/// Whether an interrupt has been received.
pub fn interrupted() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}
