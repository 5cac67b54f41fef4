//! Narrated runs with output capture
//!
//! Boot steps print a progress line, run silently and then print `[ OK ]` or
//! `[FAIL]`. Whatever the command wrote meanwhile is kept in an unnamed
//! temporary file and replayed on the error stream after the result marker,
//! so the console stays readable while nothing is lost.

use super::runner::{result_code_for, try_run, RunOptions};
use crate::context::BootContext;
use crate::error::{Error, Result};
use crate::platform::stdio::ChildStdio;
use nix::unistd::{dup2_stderr, dup2_stdout};
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::os::fd::{AsFd, OwnedFd};

/// Chunk size used when replaying captured output
pub const REPLAY_CHUNK: usize = 1024;

/// Progress narration for boot steps
#[derive(Debug, Clone, Copy)]
pub struct Narrator {
    enabled: bool,
}

impl Narrator {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Announce a step, the result marker follows on the same line
    pub fn progress<W: Write>(&self, out: &mut W, description: &str) -> io::Result<()> {
        if !self.enabled {
            return Ok(());
        }
        write!(out, "{} ... ", description)?;
        out.flush()
    }

    /// Close the progress line with a marker derived from `code`
    pub fn result<W: Write>(&self, out: &mut W, code: i32) -> io::Result<()> {
        if !self.enabled {
            return Ok(());
        }
        out.write_all(if code == 0 { b"[ OK ]\n" } else { b"[FAIL]\n" })?;
        out.flush()
    }
}

/// Standard output and error redirected into a temporary sink
///
/// Saved copies of descriptors 1 and 2 are put back when the capture is
/// finished or dropped, whichever comes first, so every exit path restores
/// the caller's streams.
pub struct OutputCapture {
    sink: Option<File>,
    saved: Option<(OwnedFd, OwnedFd)>,
}

impl OutputCapture {
    /// Redirect stdout and stderr into a fresh unnamed temporary file
    pub fn begin() -> Result<Self> {
        let sink = tempfile::tempfile()?;
        Self::begin_with(sink)
    }

    /// Redirect stdout and stderr into `sink`
    pub fn begin_with(sink: File) -> Result<Self> {
        flush_std_streams();
        let saved_stdout = io::stdout().as_fd().try_clone_to_owned()?;
        let saved_stderr = io::stderr().as_fd().try_clone_to_owned()?;

        let capture = Self {
            sink: Some(sink),
            saved: Some((saved_stdout, saved_stderr)),
        };

        // On failure `capture` drops here and undoes a half-done redirect
        if let Some(sink) = &capture.sink {
            dup2_stdout(sink)?;
            dup2_stderr(sink)?;
        }
        Ok(capture)
    }

    /// Restore the original streams and hand back the sink
    pub fn finish(mut self) -> Option<File> {
        self.restore();
        self.sink.take()
    }

    fn restore(&mut self) {
        let Some((stdout, stderr)) = self.saved.take() else {
            return;
        };
        flush_std_streams();
        if let Err(e) = dup2_stdout(&stdout) {
            error!("Failed restoring stdout: {}", e);
        }
        if let Err(e) = dup2_stderr(&stderr) {
            error!("Failed restoring stderr: {}", e);
        }
        // The saved duplicates close as they drop
    }
}

impl Drop for OutputCapture {
    fn drop(&mut self) {
        self.restore();
    }
}

fn flush_std_streams() {
    let _ = io::stdout().flush();
    let _ = io::stderr().flush();
}

/// Copy everything in `sink` to `out`
///
/// Stops early if a write cannot take the whole chunk that was read.
/// Returns the number of bytes replayed.
pub fn replay<R, W>(sink: &mut R, out: &mut W) -> io::Result<u64>
where
    R: Read + Seek,
    W: Write,
{
    sink.seek(SeekFrom::Start(0))?;

    let mut buf = [0u8; REPLAY_CHUNK];
    let mut total = 0u64;
    loop {
        let len = sink.read(&mut buf)?;
        if len == 0 {
            break;
        }
        let written = out.write(&buf[..len])?;
        total += written as u64;
        if written != len {
            warn!("Short write replaying output ({} of {} bytes), stopping", written, len);
            break;
        }
    }

    out.flush()?;
    Ok(total)
}

/// Run `command` as a narrated boot step, replaying its output on stderr
///
/// Same result semantics as [`super::run`]; an empty command is a usage
/// error reported as 1 without creating a process.
pub fn run_interactive(ctx: &BootContext, command: &str, description: Option<&str>) -> i32 {
    let mut stderr = io::stderr();
    match run_interactive_to(ctx, command, description, &mut stderr) {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            1
        }
    }
}

/// [`run_interactive`] writing narration and replay to `out`
///
/// Only usage errors are returned as `Err`; failures of the command itself
/// are logged and folded into the result code.
pub fn run_interactive_to<W: Write>(
    ctx: &BootContext,
    command: &str,
    description: Option<&str>,
    out: &mut W,
) -> Result<i32> {
    if command.trim().is_empty() {
        return Err(Error::EmptyCommand);
    }

    let config = &ctx.config;
    let narrator = Narrator::new(config.narrate() && description.is_some());
    if let Some(description) = description {
        if let Err(e) = narrator.progress(out, description) {
            warn!("Failed writing progress for {}: {}", command, e);
        }
    }

    let capture = if config.capture() {
        match OutputCapture::begin() {
            Ok(capture) => Some(capture),
            Err(e) => {
                warn!("Cannot capture output of {}, running uncaptured: {}", command, e);
                None
            }
        }
    } else {
        None
    };

    let stdio = if capture.is_some() || config.debug {
        ChildStdio::Inherit
    } else {
        ChildStdio::Null
    };
    let result = try_run(command, &RunOptions::from_config(config).with_stdio(stdio));
    let sink = capture.and_then(OutputCapture::finish);

    let code = match result {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            result_code_for(&e)
        }
    };

    if let Err(e) = narrator.result(out, code) {
        warn!("Failed writing result for {}: {}", command, e);
    }

    if let Some(mut sink) = sink {
        if let Err(e) = replay(&mut sink, out) {
            warn!("Failed replaying output of {}: {}", command, e);
        }
    }

    Ok(code)
}
