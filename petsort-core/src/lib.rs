//! petsort-core: Core types for PET coincidence sorting.
//!
//! This crate provides the foundational data model: single detection
//! events, coincidence pairs, detector volume interning, and the columnar
//! batches the sorting and I/O crates operate on.
//!

pub mod coincidence;
pub mod error;
pub mod single;
pub mod soa;

pub use coincidence::{Coincidence, Provenance};
pub use error::{Error, Result};
pub use single::{Position, Single, VolumeId, VolumeTable};
pub use soa::{CoincidenceBatch, SinglesBatch};
