//! Error types for petsort-core.

use thiserror::Error;

/// Errors that can occur while validating or manipulating event data.
#[derive(Error, Debug)]
pub enum Error {
    /// A columnar batch has columns of unequal length.
    #[error("column {column} has length {actual}, expected {expected}")]
    ColumnLengthMismatch {
        /// Name of the offending column.
        column: &'static str,
        /// Length of the reference column.
        expected: usize,
        /// Length actually found.
        actual: usize,
    },

    /// A detection time is NaN or infinite and cannot be ordered.
    #[error("non-finite detection time at record {index}")]
    NonFiniteTime {
        /// Index of the offending record.
        index: usize,
    },

    /// A coincidence time window is negative or non-finite.
    #[error("invalid time window: {0} ns")]
    InvalidTimeWindow(f64),

    /// A delay offset is non-finite.
    #[error("invalid time offset: {0} ns")]
    InvalidTimeOffset(f64),
}

/// Result type alias for petsort-core operations.
pub type Result<T> = std::result::Result<T, Error>;
