//! End-of-bootstrap local scripts
//!
//! Once services of the configured runlevel are up, the boot driver runs the
//! site's own start scripts: the run-parts directory, if one is configured,
//! and then the classic `/etc/rc.local`.

use crate::context::BootContext;
use crate::exec::{run_interactive, run_parts};
use crate::platform::Platform;

/// What the local script step did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LocalScripts {
    /// Result of the run-parts directory, if it was run
    pub runparts: Option<i32>,
    /// Result of rc.local, if it was run
    pub rc_local: Option<i32>,
}

/// Run the run-parts directory and rc.local, skipping whichever is absent
pub fn run_local_scripts(ctx: &BootContext) -> LocalScripts {
    let config = &ctx.config;
    let filesystem = Platform::filesystem();
    let mut done = LocalScripts::default();

    if let Some(dir) = config.runparts_dir.as_deref() {
        if filesystem.is_dir(dir) {
            debug!("Running startup scripts in {} ...", dir.display());
            done.runparts = Some(run_parts(dir, None));
        }
    }

    if filesystem.is_executable(&config.rc_local) {
        let rc_local = config.rc_local.to_string_lossy();
        let description = format!("Calling {}", rc_local);
        done.rc_local = Some(run_interactive(ctx, &rc_local, Some(&description)));
    }

    done
}
