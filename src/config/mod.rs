//! Configuration management for pidone
//!
//! The execution core reads a handful of switches and paths from the boot
//! configuration: the verbosity/debug pair that gates narration and output
//! capture, the console device, and the marker files polled by the console
//! supervisor.

pub mod loader;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default console device opened by the console supervisor
pub const DEFAULT_CONSOLE: &str = "/dev/console";

/// Default sink for child stdio in the synchronous runner
pub const DEFAULT_NULL_DEVICE: &str = "/dev/null";

/// Marker whose existence means the system is going down
pub const DEFAULT_SHUTDOWN_MARKER: &str = "/tmp/shutdown";

/// Marker whose existence means consoles must not be activated
pub const DEFAULT_STOPPED_MARKER: &str = "/tmp/stopped";

/// SysV compatibility script run at the end of bootstrap
pub const DEFAULT_RC_LOCAL: &str = "/etc/rc.local";

/// Boot configuration consumed by the execution core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootConfig {
    /// Narrate boot steps and capture their output
    pub verbose: bool,

    /// Let child output through live instead of capturing it
    pub debug: bool,

    /// Terminal device attached by the console supervisor
    pub console_device: PathBuf,

    /// Device child stdio is redirected to
    pub null_device: PathBuf,

    /// Shutdown marker path
    pub shutdown_marker: PathBuf,

    /// Stopped marker path
    pub stopped_marker: PathBuf,

    /// Directory of start scripts run at the end of bootstrap
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runparts_dir: Option<PathBuf>,

    /// Local script run after the run-parts directory
    pub rc_local: PathBuf,

    /// Marker polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for BootConfig {
    fn default() -> Self {
        Self {
            verbose: true,
            debug: false,
            console_device: PathBuf::from(DEFAULT_CONSOLE),
            null_device: PathBuf::from(DEFAULT_NULL_DEVICE),
            shutdown_marker: PathBuf::from(DEFAULT_SHUTDOWN_MARKER),
            stopped_marker: PathBuf::from(DEFAULT_STOPPED_MARKER),
            runparts_dir: None,
            rc_local: PathBuf::from(DEFAULT_RC_LOCAL),
            poll_interval_ms: 1000,
        }
    }
}

impl BootConfig {
    /// Marker polling interval
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Whether interactive runs print a progress line
    pub fn narrate(&self) -> bool {
        self.verbose
    }

    /// Whether interactive runs capture child output for later replay
    pub fn capture(&self) -> bool {
        self.verbose && !self.debug
    }

    /// Apply switches found on the kernel command line
    ///
    /// Recognizes `debug`, `quiet` and their `pidone.` prefixed forms. Unknown
    /// tokens belong to other consumers and are ignored.
    pub fn apply_cmdline(&mut self, cmdline: &str) {
        for token in cmdline.split_whitespace() {
            match token.strip_prefix("pidone.").unwrap_or(token) {
                "debug" => {
                    debug!("Debug mode enabled from kernel command line");
                    self.debug = true;
                }
                "quiet" => self.verbose = false,
                _ => {}
            }
        }
    }

    /// Apply `PIDONE_DEBUG` and `PIDONE_VERBOSE` environment overrides
    pub fn apply_env(&mut self) {
        if let Some(debug) = env_flag("PIDONE_DEBUG") {
            self.debug = debug;
        }
        if let Some(verbose) = env_flag("PIDONE_VERBOSE") {
            self.verbose = verbose;
        }
    }
}

fn env_flag(name: &str) -> Option<bool> {
    let value = std::env::var(name).ok()?;
    parse_flag(&value)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
