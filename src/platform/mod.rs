//! Platform abstraction layer
//!
//! Unix primitives used around fork/exec: signal state in the child, stdio
//! redirection, terminal ownership and the few filesystem checks the
//! runners need. Functions meant for the forked child take no locks and
//! do not log.

mod traits;
#[cfg(unix)]
mod unix;

pub use traits::*;
#[cfg(unix)]
pub use unix::{signals, stdio, tty};

/// Platform implementation factory
pub struct Platform;

impl Platform {
    /// Get the platform-specific filesystem operations
    pub fn filesystem() -> Box<dyn FilesystemOps> {
        #[cfg(unix)]
        {
            Box::new(unix::UnixFilesystem::new())
        }

        #[cfg(not(unix))]
        {
            compile_error!("Unsupported platform");
        }
    }
}
