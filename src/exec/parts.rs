//! Script directory runner
//!
//! Runs every executable in a directory, one at a time, in sorted order,
//! the way SysV `rc.d` directories are driven. Scripts named `S<digit>...`
//! get `start`, `K<digit>...` get `stop`, anything else no argument, unless
//! the caller forces one argument for all of them.

use super::completion::{complete, ExitOutcome};
use super::tokenizer::ArgumentVector;
use super::{exit_child, path_to_cstring, EXEC_FAILURE_STATUS};
use crate::error::{Error, Result};
use crate::platform::{signals, Platform};
use nix::unistd::{execv, fork, ForkResult};
use std::fs;
use std::path::{Path, PathBuf};

/// What happened to one script
#[derive(Debug, Clone, PartialEq)]
pub struct PartReport {
    /// Script path
    pub path: PathBuf,
    /// Arguments after the program path
    pub args: Vec<String>,
    /// How it ended, or why it could not be run
    pub outcome: std::result::Result<ExitOutcome, String>,
}

/// Argument implied by a script name
pub fn derive_action(name: &str) -> Option<&'static str> {
    let mut chars = name.chars();
    let prefix = chars.next()?;
    if !chars.next().is_some_and(|c| c.is_ascii_digit()) {
        return None;
    }
    match prefix {
        'S' => Some("start"),
        'K' => Some("stop"),
        _ => None,
    }
}

/// Run every executable in `dir` in sorted order
///
/// Returns 0 when the directory was processed, -1 if it could not be
/// listed. Individual script failures are logged and do not stop the batch.
pub fn run_parts(dir: &Path, argument: Option<&str>) -> i32 {
    match try_run_parts(dir, argument) {
        Ok(_) => 0,
        Err(e) => {
            debug!("{}, skipping ...", e);
            -1
        }
    }
}

/// [`run_parts`] returning a report for each script that was started
pub fn try_run_parts(dir: &Path, argument: Option<&str>) -> Result<Vec<PartReport>> {
    let mut names: Vec<_> = fs::read_dir(dir)
        .map_err(|e| Error::DirectoryUnreadable {
            path: dir.to_path_buf(),
            reason: e.to_string(),
        })?
        .filter_map(|entry| entry.ok().map(|entry| entry.file_name()))
        .collect();
    names.sort();

    let filesystem = Platform::filesystem();
    let mut reports = Vec::new();

    for name in names {
        let path = dir.join(&name);
        if !filesystem.is_executable(&path) {
            debug!("Skipping {} ...", path.display());
            continue;
        }

        let args: Vec<String> = match argument {
            Some(argument) => vec![argument.to_string()],
            None => {
                debug!("Checking if {} is a sysvinit startstop script ...", path.display());
                derive_action(&name.to_string_lossy())
                    .map(|action| vec![action.to_string()])
                    .unwrap_or_default()
            }
        };

        let outcome = run_script(&path, &args).map_err(|e| e.to_string());
        match &outcome {
            Ok(outcome) if outcome.success() => {}
            Ok(outcome) => warn!("{} {}", path.display(), outcome),
            Err(e) => error!("{}", e),
        }

        reports.push(PartReport { path, args, outcome });
    }

    Ok(reports)
}

fn run_script(path: &Path, args: &[String]) -> Result<ExitOutcome> {
    let program = path.display().to_string();
    let exec_path = path_to_cstring(path)?;
    let mut exec_argv = vec![exec_path];
    exec_argv.extend(ArgumentVector::from_tokens(args.iter().cloned())?.to_exec_argv()?);

    // SAFETY: the child only unblocks signals before exec or _exit
    let pid = match unsafe { fork() } {
        Ok(ForkResult::Child) => {
            let _ = signals::unblock_all();
            let _ = execv(&exec_argv[0], &exec_argv);
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

    debug!("Calling {} ...", program);
    complete(&program, pid)
}
