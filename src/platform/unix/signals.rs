//! Signal state handed to exec'd programs
//!
//! PID 1 ignores or traps most signals and blocks others while it boots.
//! Dispositions set to a handler are reset by exec, but ignored ones and the
//! blocked mask survive it, so a child must undo both explicitly before it
//! replaces its image.

use nix::libc;
use nix::sys::signal::{sigaction, sigprocmask, SaFlags, SigAction, SigHandler, SigSet, SigmaskHow, Signal};

/// Reset the disposition of every signal to its default
///
/// Covers every named signal plus the real-time range. SIGKILL and SIGSTOP
/// cannot be changed and are skipped.
pub fn reset_dispositions() {
    let default = SigAction::new(SigHandler::SigDfl, SaFlags::empty(), SigSet::empty());

    for signal in Signal::iterator() {
        if matches!(signal, Signal::SIGKILL | Signal::SIGSTOP) {
            continue;
        }
        // SAFETY: SIG_DFL installs no handler code
        let _ = unsafe { sigaction(signal, &default) };
    }

    #[cfg(any(target_os = "linux", target_os = "android"))]
    for signum in libc::SIGRTMIN()..=libc::SIGRTMAX() {
        // SAFETY: as above, the real-time range has no nix Signal variants
        unsafe {
            libc::signal(signum, libc::SIG_DFL);
        }
    }
}

/// Unblock every signal in the calling thread's mask
pub fn unblock_all() -> nix::Result<()> {
    sigprocmask(SigmaskHow::SIG_UNBLOCK, Some(&SigSet::all()), None)
}
