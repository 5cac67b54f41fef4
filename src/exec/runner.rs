//! Synchronous process runner
//!
//! Fork, scrub the child's signal state, point its stdio at the null device,
//! exec, and block until it is gone. Every child created here is reaped
//! before the call returns.

use super::completion::{complete, ExitOutcome};
use super::tokenizer::tokenize;
use super::{exit_child, EXEC_FAILURE_STATUS};
use crate::config::{BootConfig, DEFAULT_NULL_DEVICE};
use crate::error::{Error, Result};
use crate::platform::{signals, stdio, stdio::ChildStdio};
use nix::unistd::{execvp, fork, ForkResult};
use std::path::PathBuf;

/// Knobs for a synchronous run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// What the child does with its standard streams
    pub stdio: ChildStdio,
    /// Null device path
    pub null_device: PathBuf,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            stdio: ChildStdio::Null,
            null_device: PathBuf::from(DEFAULT_NULL_DEVICE),
        }
    }
}

impl RunOptions {
    pub fn from_config(config: &BootConfig) -> Self {
        Self {
            stdio: ChildStdio::Null,
            null_device: config.null_device.clone(),
        }
    }

    pub fn with_stdio(mut self, stdio: ChildStdio) -> Self {
        self.stdio = stdio;
        self
    }
}

/// Run `command` to completion with stdio silenced
///
/// Returns the child's exit code, 1 if it died by a signal or could not be
/// run, and -1 if no process could be created. Failures are logged.
pub fn run(command: &str) -> i32 {
    run_with(command, &RunOptions::default())
}

/// [`run`] with explicit options
pub fn run_with(command: &str, options: &RunOptions) -> i32 {
    match try_run(command, options) {
        Ok(code) => code,
        Err(e) if e.is_pre_spawn() => {
            error!("Not running '{}': {}", command, e);
            result_code_for(&e)
        }
        Err(e) => {
            error!("{}", e);
            result_code_for(&e)
        }
    }
}

/// Integer result reported for a failed run
pub(crate) fn result_code_for(error: &Error) -> i32 {
    match error {
        Error::ForkFailed { .. } => -1,
        _ => 1,
    }
}

/// Run `command` to completion, reporting failures as errors
pub fn try_run(command: &str, options: &RunOptions) -> Result<i32> {
    let argv = tokenize(command)?;
    let program = argv.program().ok_or(Error::EmptyCommand)?.to_string();
    let exec_argv = argv.to_exec_argv()?;

    // SAFETY: the child only touches signal state and descriptors before
    // exec or _exit, and the argument strings were built before the fork
    let pid = match unsafe { fork() } {
        Ok(ForkResult::Child) => {
            signals::reset_dispositions();
            stdio::redirect_to_null(&options.null_device, options.stdio);
            let _ = signals::unblock_all();
            let _ = execvp(&exec_argv[0], &exec_argv);
            exit_child(EXEC_FAILURE_STATUS)
        }
        Ok(ForkResult::Parent { child }) => child,
        Err(errno) => {
            return Err(Error::ForkFailed {
                program,
                reason: errno.desc().to_string(),
            })
        }
    };

    let outcome = complete(&program, pid)?;
    match outcome {
        ExitOutcome::Exited(code) => debug!("Started {} and ended OK: {}", program, code),
        ExitOutcome::Signaled(signal) => {
            debug!("Process {} terminated by signal {}", program, signal)
        }
    }

    Ok(outcome.result_code())
}
