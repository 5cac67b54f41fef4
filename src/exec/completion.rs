//! Child completion
//!
//! One blocking `waitpid` for one child, decoded into an [`ExitOutcome`].
//! Nothing here retries: an interrupted or failed wait is handed back to the
//! caller, who decides whether it matters for the boot.

use crate::error::{Error, Result};
use nix::errno::Errno;
use nix::sys::signal::Signal;
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::Pid;
use std::fmt;

/// How a child terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    /// Normal exit with the given code
    Exited(i32),
    /// Killed by a signal
    Signaled(Signal),
}

impl ExitOutcome {
    /// Map the outcome to the integer result reported to callers
    ///
    /// A normal exit reports its code verbatim. A signal death carries no
    /// exit code of its own and is always reported as 1, never as success.
    pub fn result_code(self) -> i32 {
        match self {
            ExitOutcome::Exited(code) => code,
            ExitOutcome::Signaled(_) => 1,
        }
    }

    pub fn success(self) -> bool {
        self == ExitOutcome::Exited(0)
    }
}

impl fmt::Display for ExitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitOutcome::Exited(code) => write!(f, "exited with status {}", code),
            ExitOutcome::Signaled(signal) => write!(f, "terminated by signal {}", signal),
        }
    }
}

/// Block until `pid` terminates and return how it ended
///
/// `command` only names the child in errors.
pub fn complete(command: &str, pid: Pid) -> Result<ExitOutcome> {
    match waitpid(pid, None) {
        Ok(WaitStatus::Exited(_, code)) => Ok(ExitOutcome::Exited(code)),
        Ok(WaitStatus::Signaled(_, signal, _)) => Ok(ExitOutcome::Signaled(signal)),
        Ok(other) => Err(Error::UnexpectedWaitStatus {
            command: command.to_string(),
            status: format!("{:?}", other),
        }),
        Err(Errno::EINTR) => Err(Error::WaitInterrupted {
            command: command.to_string(),
        }),
        Err(Errno::ECHILD) => Err(Error::ChildAlreadyReaped {
            command: command.to_string(),
        }),
        Err(errno) => Err(Error::WaitFailed {
            command: command.to_string(),
            errno: errno as i32,
            description: errno.desc().to_string(),
        }),
    }
}
