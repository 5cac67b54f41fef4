//! Controlling terminal handling for the console supervisor

use nix::libc;
use std::ffi::CStr;
use std::os::fd::RawFd;

nix::ioctl_write_int_bad!(tiocsctty, libc::TIOCSCTTY);

/// Make the terminal open on `fd` the controlling terminal of the calling
/// session leader, stealing it if another session holds it
pub fn claim_controlling_tty(fd: RawFd) -> nix::Result<()> {
    // SAFETY: TIOCSCTTY takes an int argument and touches no user memory
    unsafe { tiocsctty(fd, 1) }.map(drop)
}

/// Hang up the current controlling terminal, detaching this process from it
#[cfg(any(target_os = "linux", target_os = "android"))]
pub fn hangup() {
    // SAFETY: vhangup has no arguments and only affects terminal state
    unsafe {
        libc::vhangup();
    }
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
pub fn hangup() {}

/// Label the calling process, visible in `ps` and /proc/<pid>/comm
#[cfg(any(target_os = "linux", target_os = "android"))]
pub fn set_process_name(name: &CStr) -> nix::Result<()> {
    nix::sys::prctl::set_name(name)
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
pub fn set_process_name(_name: &CStr) -> nix::Result<()> {
    Ok(())
}
