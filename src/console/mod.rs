//! Console supervisor
//!
//! Forks a long-lived process per terminal line that waits until the system
//! is allowed to offer a login, optionally asks the operator to press Enter,
//! and then replaces itself with the getty or shell. Two marker files steer
//! it: while the stopped marker exists nothing is activated, and once the
//! shutdown marker exists the process exits.
//!
//! Markers are polled, never watched.

use crate::config::BootConfig;
use crate::error::{Error, Result};
use crate::exec::tokenizer::ArgumentVector;
use crate::exec::{exit_child, path_to_cstring};
use crate::platform::{signals, stdio, tty};
use nix::fcntl::{fcntl, FcntlArg, FdFlag};
use nix::libc;
use nix::poll::{poll, PollFd, PollFlags, PollTimeout};
use nix::unistd::{close, dup2_stderr, dup2_stdout, execv, fork, setsid, ForkResult, Pid};
use std::ffi::CString;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::fd::{AsFd, AsRawFd};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

/// Prompt written to an attached console before activation
pub const CONSOLE_PROMPT: &[u8] = b"\nPlease press Enter to activate this console.";

/// Marker files consumed by the supervisor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markers {
    shutdown: PathBuf,
    stopped: PathBuf,
}

/// One observation of both markers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MarkerStatus {
    pub shutdown: bool,
    pub stopped: bool,
}

impl Markers {
    pub fn new(shutdown: impl Into<PathBuf>, stopped: impl Into<PathBuf>) -> Self {
        Self {
            shutdown: shutdown.into(),
            stopped: stopped.into(),
        }
    }

    pub fn from_config(config: &BootConfig) -> Self {
        Self::new(&config.shutdown_marker, &config.stopped_marker)
    }

    pub fn shutdown(&self) -> bool {
        self.shutdown.exists()
    }

    pub fn stopped(&self) -> bool {
        self.stopped.exists()
    }

    pub fn status(&self) -> MarkerStatus {
        MarkerStatus {
            shutdown: self.shutdown(),
            stopped: self.stopped(),
        }
    }
}

/// Supervisor loop states
///
/// There is no final state: the loop ends either by exiting on shutdown or
/// by exec replacing the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleState {
    /// Stopped marker present, sleeping
    Idle,
    /// Prompt written, waiting for Enter
    PromptWait,
    /// About to exec the login program
    Activate,
}

impl ConsoleState {
    /// State entered at the top of the loop, `None` when it is time to exit
    pub fn next(status: MarkerStatus, attach_console: bool) -> Option<Self> {
        if status.shutdown {
            None
        } else if status.stopped {
            Some(ConsoleState::Idle)
        } else if attach_console {
            Some(ConsoleState::PromptWait)
        } else {
            Some(ConsoleState::Activate)
        }
    }

    /// State after the operator pressed Enter
    pub fn after_prompt(status: MarkerStatus) -> Self {
        if status.stopped || status.shutdown {
            ConsoleState::Idle
        } else {
            ConsoleState::Activate
        }
    }
}

/// Fork a console supervisor for `program`
///
/// `args` is the full argument vector handed to exec, `argv[0]` included;
/// when empty the program path is used as `argv[0]`. Returns the pid of the
/// supervisor right away. The caller owns reaping it.
pub fn spawn_console(
    config: &BootConfig,
    program: &Path,
    args: &[String],
    attach_console: bool,
) -> Result<Pid> {
    let program_name = program.display().to_string();
    let exec_path = path_to_cstring(program)?;
    let exec_argv = if args.is_empty() {
        vec![exec_path.clone()]
    } else {
        ArgumentVector::from_tokens(args.iter().cloned())?.to_exec_argv()?
    };

    let supervisor = Supervisor {
        markers: Markers::from_config(config),
        console_device: config.console_device.clone(),
        poll_interval: config.poll_interval(),
        attach_console,
        program: exec_path,
        argv: exec_argv,
    };

    // SAFETY: the child never returns into the caller; it loops until exec
    // or _exit
    match unsafe { fork() } {
        Ok(ForkResult::Child) => supervisor.run(),
        Ok(ForkResult::Parent { child }) => {
            debug!("Console supervisor for {} started as {}", program_name, child);
            Ok(child)
        }
        Err(errno) => Err(Error::ForkFailed {
            program: program_name,
            reason: errno.desc().to_string(),
        }),
    }
}

struct Supervisor {
    markers: Markers,
    console_device: PathBuf,
    poll_interval: Duration,
    attach_console: bool,
    program: CString,
    argv: Vec<CString>,
}

impl Supervisor {
    fn run(self) -> ! {
        let console = if self.attach_console {
            Some(attach(&self.console_device))
        } else {
            None
        };

        let _ = signals::unblock_all();
        let _ = setsid();
        if let Err(e) = tty::claim_controlling_tty(libc::STDIN_FILENO) {
            stdio::write_diagnostic(
                io::stderr(),
                &[b"pidone: Failed TIOCSCTTY: ", e.desc().as_bytes()],
            );
        }

        while let Some(mut state) = ConsoleState::next(self.markers.status(), self.attach_console) {
            if state == ConsoleState::Idle {
                thread::sleep(self.poll_interval);
                continue;
            }

            if state == ConsoleState::PromptWait {
                if let Some(console) = &console {
                    self.wait_for_enter(console);
                }
                state = ConsoleState::after_prompt(self.markers.status());
                if state != ConsoleState::Activate {
                    continue;
                }
            }

            debug_assert_eq!(state, ConsoleState::Activate);
            if let Err(e) = execv(&self.program, &self.argv) {
                stdio::write_diagnostic(
                    io::stderr(),
                    &[b"pidone: Failed starting ", self.program.as_bytes(), b": ", e.desc().as_bytes()],
                );
                thread::sleep(self.poll_interval);
            }
        }

        drop(console);
        exit_child(0)
    }

    /// Prompt and consume input up to a newline, giving up early if a marker
    /// appears, the console hits end of file or reading fails
    fn wait_for_enter(&self, console: &File) {
        let mut writer = console;
        let _ = writer.write_all(CONSOLE_PROMPT);

        let timeout = PollTimeout::from(
            u16::try_from(self.poll_interval.as_millis()).unwrap_or(u16::MAX),
        );
        let mut byte = [0u8; 1];
        loop {
            let status = self.markers.status();
            if status.stopped || status.shutdown {
                return;
            }

            let mut fds = [PollFd::new(console.as_fd(), PollFlags::POLLIN)];
            match poll(&mut fds, timeout) {
                Ok(0) => continue,
                Ok(_) => {}
                Err(nix::errno::Errno::EINTR) => continue,
                Err(_) => return,
            }

            let mut reader = console;
            match reader.read(&mut byte) {
                Ok(1) if byte[0] == b'\n' => return,
                Ok(1) => continue,
                Ok(_) => return,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(_) => return,
            }
        }
    }
}

/// Detach from the inherited terminal and make `device` stdin/out/err
///
/// Exits the child with status 1 if the device does not land on fd 0.
fn attach(device: &Path) -> File {
    tty::hangup();

    let _ = close(libc::STDERR_FILENO);
    let _ = close(libc::STDOUT_FILENO);
    let _ = close(libc::STDIN_FILENO);

    let console = match OpenOptions::new().read(true).write(true).open(device) {
        Ok(console) if console.as_raw_fd() == libc::STDIN_FILENO => console,
        _ => exit_child(1),
    };

    // std opens close-on-exec, the login program needs fd 0 to survive
    let _ = fcntl(&console, FcntlArg::F_SETFD(FdFlag::empty()));
    let _ = dup2_stdout(&console);
    let _ = dup2_stderr(&console);
    let _ = tty::set_process_name(c"console");

    console
}
