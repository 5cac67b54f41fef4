//! Process execution core
//!
//! Turns a command line into a child process and reaps it:
//!
//! - [`tokenizer`] - command line to argument vector
//! - [`completion`] - blocking wait for one child
//! - [`runner`] - synchronous fork/exec/wait
//! - [`interactive`] - narrated runs with output capture and replay
//! - [`parts`] - SysV style script directories
//!
//! Parallelism is only ever a forked process; nothing here spawns threads.

use crate::error::{Error, Result};
use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

pub mod completion;
pub mod interactive;
pub mod parts;
pub mod runner;
pub mod tokenizer;

pub use completion::{complete, ExitOutcome};
pub use interactive::{run_interactive, run_interactive_to, Narrator, OutputCapture};
pub use parts::{derive_action, run_parts, try_run_parts, PartReport};
pub use runner::{run, run_with, try_run, RunOptions};
pub use tokenizer::{tokenize, ArgumentVector, ARGV_CAPACITY, MAX_TOKENS};

/// Exit status of a child whose exec failed
pub const EXEC_FAILURE_STATUS: i32 = 127;

/// Exec-ready copy of `path`, byte for byte
///
/// Unix file names need not be UTF-8, so the path never goes through `str`.
pub(crate) fn path_to_cstring(path: &Path) -> Result<CString> {
    CString::new(path.as_os_str().as_bytes()).map_err(|e| Error::InvalidArgument {
        argument: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Terminate a forked child without running any of the parent's cleanup
pub(crate) fn exit_child(code: i32) -> ! {
    // SAFETY: _exit skips atexit handlers and stdio flushing that belong to
    // the parent's copy of the address space
    unsafe { nix::libc::_exit(code) }
}
