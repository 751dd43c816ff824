//! Verification error types.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for verification operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Verification error types.
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Statistics file does not exist.
    #[error("stats file not found: {}", .0.display())]
    MissingStatsFile(PathBuf),

    /// Statistics file contains no recognizable entries.
    #[error("no statistics entries in {}", .0.display())]
    MalformedStatsFile(PathBuf),
}
