//! Integration tests for narrated runs
//!
//! Capture rewires descriptors 1 and 2 of the whole test process, so these
//! tests never run concurrently.

use pidone::config::BootConfig;
use pidone::exec::interactive::REPLAY_CHUNK;
use pidone::exec::{run_interactive, run_interactive_to, OutputCapture};
use pidone::{BootContext, Error};
use serial_test::serial;
use std::fs;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::PathBuf;

fn context(verbose: bool, debug: bool) -> BootContext {
    BootContext::new(BootConfig {
        verbose,
        debug,
        ..BootConfig::default()
    })
}

fn stdout_target() -> PathBuf {
    fs::read_link("/proc/self/fd/1").unwrap()
}

fn stderr_target() -> PathBuf {
    fs::read_link("/proc/self/fd/2").unwrap()
}

#[test]
#[serial]
fn test_success_is_narrated_then_replayed() {
    let ctx = context(true, false);
    let mut out = Vec::new();

    let code = run_interactive_to(&ctx, "echo hello world", Some("Greeting"), &mut out).unwrap();
    assert_eq!(code, 0);
    assert_eq!(String::from_utf8(out).unwrap(), "Greeting ... [ OK ]\nhello world\n");
}

#[test]
#[serial]
fn test_failure_marker_and_stderr_capture() {
    let ctx = context(true, false);
    let mut out = Vec::new();

    let code =
        run_interactive_to(&ctx, "sh -c 'echo oops >&2; exit 4'", Some("Checking"), &mut out)
            .unwrap();
    assert_eq!(code, 4);
    assert_eq!(String::from_utf8(out).unwrap(), "Checking ... [FAIL]\noops\n");
}

#[test]
#[serial]
fn test_large_output_replayed_in_order() {
    let ctx = context(true, false);
    let mut out = Vec::new();
    let script = "sh -c 'i=0; while [ $i -lt 2000 ]; do echo line $i; i=$((i+1)); done'";

    let code = run_interactive_to(&ctx, script, Some("Flooding"), &mut out).unwrap();
    assert_eq!(code, 0);

    let mut expected = String::from("Flooding ... [ OK ]\n");
    for i in 0..2000 {
        expected.push_str(&format!("line {}\n", i));
    }
    assert!(expected.len() > REPLAY_CHUNK * 4);
    assert_eq!(String::from_utf8(out).unwrap(), expected);
}

#[test]
#[serial]
fn test_no_description_means_no_narration() {
    let ctx = context(true, false);
    let mut out = Vec::new();

    let code = run_interactive_to(&ctx, "echo quietly", None, &mut out).unwrap();
    assert_eq!(code, 0);
    assert_eq!(String::from_utf8(out).unwrap(), "quietly\n");
}

#[test]
#[serial]
fn test_quiet_mode_discards_output() {
    let ctx = context(false, false);
    let mut out = Vec::new();

    let code = run_interactive_to(&ctx, "echo discarded", Some("Silent"), &mut out).unwrap();
    assert_eq!(code, 0);
    assert!(out.is_empty());
}

#[test]
#[serial]
fn test_debug_mode_narrates_without_capture() {
    let ctx = context(true, true);
    let mut out = Vec::new();

    let code = run_interactive_to(&ctx, "true", Some("Debugging"), &mut out).unwrap();
    assert_eq!(code, 0);
    assert_eq!(String::from_utf8(out).unwrap(), "Debugging ... [ OK ]\n");
}

#[test]
#[serial]
fn test_unrunnable_command_fails_and_restores_streams() {
    let ctx = context(true, false);
    let (stdout, stderr) = (stdout_target(), stderr_target());
    let mut out = Vec::new();

    let code =
        run_interactive_to(&ctx, "/nonexistent/program", Some("Missing"), &mut out).unwrap();
    assert_eq!(code, 127);
    assert!(String::from_utf8(out).unwrap().starts_with("Missing ... [FAIL]\n"));
    assert_eq!(stdout_target(), stdout);
    assert_eq!(stderr_target(), stderr);
}

#[test]
#[serial]
fn test_oversized_command_restores_streams() {
    let ctx = context(true, false);
    let (stdout, stderr) = (stdout_target(), stderr_target());
    let command = (0..20).map(|i| i.to_string()).collect::<Vec<_>>().join(" ");

    assert_eq!(run_interactive(&ctx, &command, Some("Overflow")), 1);
    assert_eq!(stdout_target(), stdout);
    assert_eq!(stderr_target(), stderr);
}

#[test]
#[serial]
fn test_empty_command_is_usage_error() {
    let ctx = context(true, false);
    let mut out = Vec::new();

    assert!(matches!(
        run_interactive_to(&ctx, "  ", Some("Nothing"), &mut out),
        Err(Error::EmptyCommand)
    ));
    assert!(out.is_empty());
    assert_eq!(run_interactive(&ctx, "", None), 1);
}

#[test]
#[serial]
fn test_capture_guard_restores_on_drop() {
    let stdout = stdout_target();
    {
        let _capture = OutputCapture::begin().unwrap();
        assert_ne!(stdout_target(), stdout);
    }
    assert_eq!(stdout_target(), stdout);
}

#[test]
#[serial]
fn test_capture_collects_direct_writes() {
    let capture = OutputCapture::begin().unwrap();
    io::stdout().write_all(b"to stdout\n").unwrap();
    io::stderr().write_all(b"to stderr\n").unwrap();
    let mut sink = capture.finish().unwrap();

    let mut captured = String::new();
    sink.seek(SeekFrom::Start(0)).unwrap();
    sink.read_to_string(&mut captured).unwrap();
    assert_eq!(captured, "to stdout\nto stderr\n");
}
