//! Integration tests for the synchronous runner
//!
//! Every test here forks real processes; descriptor accounting needs the
//! tests to run one at a time.

use pidone::exec::{run, run_with, try_run, RunOptions};
use pidone::platform::stdio::ChildStdio;
use pidone::Error;
use serial_test::serial;
use std::fs;
use std::path::PathBuf;

fn open_descriptors() -> usize {
    fs::read_dir("/proc/self/fd").map(|dir| dir.count()).unwrap_or(0)
}

#[test]
#[serial]
fn test_exit_code_passes_through() {
    assert_eq!(run("true"), 0);
    for code in [1, 2, 7, 42, 126, 255] {
        let command = format!("sh -c \"exit {}\"", code);
        assert_eq!(run(&command), code, "exit {} should be reported as is", code);
    }
}

#[test]
#[serial]
fn test_signal_death_is_failure() {
    // The shell kills itself before it could exit 0
    assert_eq!(run("sh -c 'kill -9 $$; exit 0'"), 1);
    assert_eq!(run("sh -c 'kill -TERM $$; exit 0'"), 1);
}

#[test]
#[serial]
fn test_missing_program_is_failure() {
    assert_eq!(run("/nonexistent/program --flag"), 127);
}

#[test]
#[serial]
fn test_empty_and_oversized_commands() {
    assert_eq!(run(""), 1);
    assert_eq!(run("   "), 1);

    let oversized = (0..16).map(|i| format!("a{}", i)).collect::<Vec<_>>().join(" ");
    assert_eq!(run(&oversized), 1);
    assert!(matches!(
        try_run(&oversized, &RunOptions::default()),
        Err(Error::ArgumentOverflow { .. })
    ));
}

#[test]
#[serial]
fn test_quoted_argument_reaches_child() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("with space");
    let command = format!("touch \"{}\"", target.display());
    assert_eq!(run(&command), 0);
    assert!(target.exists());
}

#[test]
#[serial]
fn test_child_stdin_is_null() {
    // Reading stdin must hit end of file at once
    assert_eq!(run("sh -c 'if read line; then exit 3; fi'"), 0);
}

#[test]
#[serial]
fn test_inherit_keeps_stdin_null() {
    let options = RunOptions::default().with_stdio(ChildStdio::Inherit);
    assert_eq!(run_with("sh -c 'if read line; then exit 3; fi'", &options), 0);
}

#[test]
#[serial]
fn test_broken_null_device_still_runs() {
    let options = RunOptions {
        stdio: ChildStdio::Null,
        null_device: PathBuf::from("/nonexistent/null"),
    };
    assert_eq!(run_with("true", &options), 0);
}

#[test]
#[serial]
fn test_repeated_runs_leave_nothing_behind() {
    let before = open_descriptors();
    for _ in 0..50 {
        assert_eq!(run("true"), 0);
    }
    assert_eq!(open_descriptors(), before);
}
