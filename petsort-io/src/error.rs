//! I/O error types.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for I/O operations.
pub type Result<T> = std::result::Result<T, Error>;

/// I/O error types.
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Input file does not exist.
    #[error("input file not found: {}", .0.display())]
    MissingInput(PathBuf),

    /// Expected group is absent from the file.
    #[error("group '{group}' not found (file has: {available})")]
    MissingGroup {
        /// Name of the group that was looked up.
        group: String,
        /// Comma-separated members actually present.
        available: String,
    },

    /// Required dataset is absent from a group.
    #[error("required dataset '{dataset}' not found in group '{group}'")]
    MissingDataset {
        /// Name of the dataset that was looked up.
        dataset: String,
        /// Group it was expected in.
        group: String,
    },

    /// Invalid file format.
    #[error("invalid file format: {0}")]
    InvalidFormat(String),

    /// Core library error.
    #[error("core error: {0}")]
    Core(#[from] petsort_core::Error),

    /// HDF5 library error.
    #[cfg(feature = "hdf5")]
    #[error("HDF5 error: {0}")]
    Hdf5(#[from] hdf5::Error),
}
