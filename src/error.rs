//! Error types for packaging and index-synchronization operations.
//!
//! This module defines all error types with actionable error messages and the
//! exit-code mapping used by the CLI.

use thiserror::Error;

use crate::manifest::sync::SyncError;

/// Result type alias for packager operations
pub type Result<T> = std::result::Result<T, PackagerError>;

/// Main error type for all packager operations
#[derive(Error, Debug)]
pub enum PackagerError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// ZIP archive errors
    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Directory traversal errors
    #[error("directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// Index synchronization errors
    #[error(transparent)]
    Sync(#[from] SyncError),

    /// Generic errors from anyhow
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Command execution failed
    #[error("Command execution failed: {command} - {reason}")]
    ExecutionFailed {
        /// Command that failed
        command: String,
        /// Reason for the error
        reason: String,
    },
}

impl PackagerError {
    /// Process exit code for this error.
    ///
    /// Synchronization errors carry their own distinguishing codes
    /// (missing artifact, unparseable index, failed index write); everything
    /// else maps to the generic failure code 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Sync(e) => e.exit_code(),
            _ => 1,
        }
    }
}
