//! petsort-verify: regression checks for simulation outputs.
//!
//! Provides the tolerance-based comparisons used to validate a fresh
//! simulation run against stored reference results: run statistics
//! files (event, track, and step counts) and reconstructed voxel
//! images (geometry, total activity, and normalized voxel-wise
//! difference). All comparisons collect their outcomes into a
//! [`Report`] rather than failing fast, so a single run surfaces
//! every deviation at once.
//!

pub mod error;
pub mod image;
pub mod report;
pub mod stats;

pub use error::{Error, Result};
pub use image::{compare_geometry, compare_images, Image, ImageCompareOptions, ImageInfo};
pub use report::{Check, Report};
pub use stats::{
    compare_stats, parse_stats, read_stats_file, relative_difference_percent, SimStats, StatValue,
};
