//! petsort-algorithms: Coincidence sorting for simulated PET singles.
//!
//! This crate provides the time-window coincidence sorter:
//! - **Serial** - single pass over time-ordered singles
//! - **Parallel** - rayon over window-opener ranges, identical output
//! - **Prompt/delayed** - paired passes for randoms estimation
//!
#![warn(missing_docs)]

mod parallel;
mod processing;
mod sorter;

pub use parallel::par_sort_coincidences;
pub use processing::{sort_prompt_and_delayed, PromptDelayed, DEFAULT_DELAY_OFFSET_NS};
pub use sorter::{
    sort_coincidences, sort_coincidences_with_progress, SortConfig, SortProgress,
    DEFAULT_TIME_WINDOW_NS,
};
