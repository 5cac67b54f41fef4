//! pidone - process execution core for a PID 1 init
//!
//! This library turns textual commands into running, supervised or reaped
//! child processes during system bootstrap. Everything here may run as
//! process 1, where a hung wait, a leaked descriptor or a stray signal
//! handler takes the whole machine down, so every child is reaped by the
//! call that created it and every redirected stream is restored.
//!
//! ## Module Organization
//!
//! - [`exec`] - tokenizer, synchronous runner, narrated runner, run-parts
//! - [`console`] - console supervisor and its marker-driven loop
//! - [`config`] - boot configuration, file/env/kernel command line loading
//! - [`context`] - explicit bootstrap state passed to callers
//! - [`boot`] - end-of-bootstrap local scripts
//! - [`platform`] - signal, stdio and terminal primitives
//! - [`mod@error`] - error types and Result alias
//!
//! ## Quick Start
//!
//! ```no_run
//! use pidone::{exec, init};
//!
//! let ctx = init();
//! if exec::run_interactive(&ctx, "mount -na", Some("Mounting filesystems")) != 0 {
//!     // boot driver policy decides what a failed mount means
//! }
//! let _ = exec::run("swapon -ea");
//! ```
//!
//! ## Concurrency
//!
//! Work is parallel only across processes. Runners block the caller until
//! their child is reaped; the console supervisor is the one asynchronous
//! piece and hands back a pid immediately.

#[macro_use]
extern crate tracing;

pub mod boot;
pub mod config;
pub mod console;
pub mod context;
pub mod error;
pub mod exec;
pub mod platform;

pub use config::loader::ConfigLoader;
pub use config::BootConfig;
pub use console::spawn_console;
pub use context::BootContext;
pub use error::{Error, Result};
pub use exec::{run, run_interactive, run_parts, ExitOutcome};

/// The current version of pidone from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The package name from Cargo.toml
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Build the bootstrap context from the default configuration locations
///
/// Never fails: a missing or broken configuration falls back to defaults.
pub fn init() -> BootContext {
    info!("Initializing {} v{}", NAME, VERSION);
    BootContext::new(ConfigLoader::load())
}

/// Build the bootstrap context from a specific configuration file
pub fn init_with_config(config_path: &std::path::Path) -> Result<BootContext> {
    info!(
        "Initializing {} v{} with config: {}",
        NAME,
        VERSION,
        config_path.display()
    );

    let mut config = ConfigLoader::load_from_file(config_path).map_err(|e| {
        error!("Failed to load configuration from {}: {}", config_path.display(), e);
        e
    })?;
    config.apply_env();
    Ok(BootContext::new(config))
}
