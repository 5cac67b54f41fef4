//! Platform-specific operation traits

use std::path::Path;

/// Platform-specific filesystem operations
pub trait FilesystemOps: Send + Sync {
    /// Check if a path is an executable non-directory entry
    fn is_executable(&self, path: &Path) -> bool;

    /// Check if a path is a directory
    fn is_dir(&self, path: &Path) -> bool;
}
