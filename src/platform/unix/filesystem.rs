//! Unix filesystem operations

use crate::platform::traits::FilesystemOps;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

pub struct UnixFilesystem;

impl UnixFilesystem {
    pub fn new() -> Self {
        Self
    }
}

impl FilesystemOps for UnixFilesystem {
    fn is_executable(&self, path: &Path) -> bool {
        match path.metadata() {
            // Any execute bit counts, directories never do
            Ok(metadata) => !metadata.is_dir() && metadata.permissions().mode() & 0o111 != 0,
            Err(_) => false,
        }
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }
}
