//! Standard stream plumbing for forked children

use nix::unistd::{dup2_stderr, dup2_stdin, dup2_stdout, write};
use std::fs::OpenOptions;
use std::os::fd::AsFd;
use std::path::Path;

/// What a child does with its standard streams before exec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChildStdio {
    /// stdin, stdout and stderr all go to the null device
    #[default]
    Null,
    /// Only stdin goes to the null device, output is inherited
    Inherit,
}

/// Point the standard streams at the null device according to `mode`
///
/// Best effort: if the device cannot be opened the streams are left alone
/// and `false` is returned. The opened descriptor is close-on-exec, only the
/// duplicates on 0/1/2 survive into the new image.
pub fn redirect_to_null(null_device: &Path, mode: ChildStdio) -> bool {
    let null = match OpenOptions::new().read(true).write(true).open(null_device) {
        Ok(file) => file,
        Err(_) => return false,
    };

    let mut ok = dup2_stdin(&null).is_ok();
    if mode == ChildStdio::Null {
        ok &= dup2_stdout(&null).is_ok();
        ok &= dup2_stderr(&null).is_ok();
    }
    ok
}

/// Write a diagnostic line made of `parts` straight to `fd`
///
/// For forked children: no formatting, no allocation and no logger, only
/// `write(2)` calls. A trailing newline is appended.
pub fn write_diagnostic<Fd: AsFd>(fd: Fd, parts: &[&[u8]]) {
    for part in parts.iter().copied().chain([&b"\n"[..]]) {
        let mut rest = part;
        while !rest.is_empty() {
            match write(&fd, rest) {
                Ok(0) | Err(_) => return,
                Ok(n) => rest = &rest[n..],
            }
        }
    }
}
