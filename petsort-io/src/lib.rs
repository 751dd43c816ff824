//! petsort-io: File I/O for PET singles and coincidence tables.
//!
//! This crate reads and writes the columnar HDF5 tables the sorting
//! pipeline operates on, and exports coincidence tables as CSV.
//!

mod error;
#[cfg(feature = "hdf5")]
pub mod hdf5;
mod writer;

pub use error::{Error, Result};
#[cfg(feature = "hdf5")]
pub use self::hdf5::{
    read_coincidences_hdf5, read_singles_hdf5, write_coincidences_hdf5, write_singles_hdf5,
    CoincidenceTable, SinglesTable, TableWriteOptions, DEFAULT_COINCIDENCES_GROUP,
    DEFAULT_SINGLES_GROUP,
};
pub use writer::CoincidenceFileWriter;
