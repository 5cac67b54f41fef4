//! Bootstrap context
//!
//! State the boot driver would otherwise keep in globals: the configuration,
//! the watchdog process and the runlevel bookkeeping. Built once at startup
//! and passed by reference to whatever needs it. The execution core itself
//! only reads the configuration.

use crate::config::BootConfig;
use nix::unistd::Pid;

/// Runlevel used while bootstrapping, before the configured one is entered
pub const BOOTSTRAP_RUNLEVEL: u8 = 0;

/// Explicit bootstrap-wide state
#[derive(Debug, Clone)]
pub struct BootContext {
    /// Boot configuration
    pub config: BootConfig,
    /// Built-in watchdog process, if one was started
    pub watchdog_pid: Option<Pid>,
    runlevel: u8,
    prev_runlevel: Option<u8>,
}

impl BootContext {
    pub fn new(config: BootConfig) -> Self {
        Self {
            config,
            watchdog_pid: None,
            runlevel: BOOTSTRAP_RUNLEVEL,
            prev_runlevel: None,
        }
    }

    /// Current runlevel
    pub fn runlevel(&self) -> u8 {
        self.runlevel
    }

    /// Runlevel before the last change, `None` while still bootstrapping
    pub fn prev_runlevel(&self) -> Option<u8> {
        self.prev_runlevel
    }

    pub fn is_bootstrapping(&self) -> bool {
        self.prev_runlevel.is_none() && self.runlevel == BOOTSTRAP_RUNLEVEL
    }

    /// Record a runlevel change
    pub fn set_runlevel(&mut self, level: u8) {
        if level == self.runlevel {
            return;
        }
        debug!("Runlevel change {} -> {}", self.runlevel, level);
        self.prev_runlevel = Some(self.runlevel);
        self.runlevel = level;
    }
}

impl Default for BootContext {
    fn default() -> Self {
        Self::new(BootConfig::default())
    }
}
