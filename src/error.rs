//! Error types and Result aliases for pidone

use std::path::PathBuf;

/// Result type alias for pidone operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for pidone
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // === Command line errors ===
    /// Command line has nothing to execute
    #[error("Command cannot be empty")]
    EmptyCommand,

    /// More tokens than the argument vector can hold
    #[error("Command too long: '{command}' (at most {limit} arguments)")]
    ArgumentOverflow { command: String, limit: usize },

    /// Argument cannot be handed to exec
    #[error("Invalid argument '{argument}': {reason}")]
    InvalidArgument { argument: String, reason: String },

    // === Process errors ===
    /// fork(2) failed
    #[error("Failed to fork for '{program}': {reason}")]
    ForkFailed { program: String, reason: String },

    /// waitpid(2) was interrupted by an unblocked signal
    #[error("Caught unblocked signal waiting for '{command}', aborting")]
    WaitInterrupted { command: String },

    /// The child was reaped by someone else
    #[error("Caught SIGCHLD waiting for '{command}', aborting")]
    ChildAlreadyReaped { command: String },

    /// Any other waitpid(2) failure
    #[error("Failed waiting for '{command}', error {errno}: {description}")]
    WaitFailed {
        command: String,
        errno: i32,
        description: String,
    },

    /// waitpid(2) reported a state other than exit or signal death
    #[error("Unexpected wait status for '{command}': {status}")]
    UnexpectedWaitStatus { command: String, status: String },

    // === Batch runner errors ===
    /// Script directory cannot be listed
    #[error("Cannot list '{}': {reason}", path.display())]
    DirectoryUnreadable { path: PathBuf, reason: String },

    // === Configuration errors ===
    /// Failed to load configuration file
    #[error("Failed to load config from '{}': {reason}", path.display())]
    ConfigLoadFailed { path: PathBuf, reason: String },

    /// Failed to parse configuration
    #[error("Failed to parse {format} config: {reason}")]
    ConfigParseFailed { format: String, reason: String },

    /// Failed to serialize configuration
    #[error("Failed to serialize config as {format}: {reason}")]
    ConfigSerializationFailed { format: String, reason: String },

    /// Configuration validation failed
    #[error("Configuration validation failed for '{field}': {reason}")]
    ConfigValidationFailed { field: String, reason: String },

    // === I/O and system call errors ===
    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// System call errors surfaced by nix
    #[error("System call failed: {0}")]
    Nix(#[from] nix::Error),
}

impl Error {
    /// Whether the error was raised before any process was created
    pub fn is_pre_spawn(&self) -> bool {
        matches!(
            self,
            Error::EmptyCommand | Error::ArgumentOverflow { .. } | Error::InvalidArgument { .. }
        )
    }
}
