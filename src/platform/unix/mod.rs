//! Unix-specific platform implementations

mod filesystem;
pub mod signals;
pub mod stdio;
pub mod tty;

pub use filesystem::UnixFilesystem;
