//! Prompt and delayed sorting passes.
//!
//! Randoms estimation with the delayed window method runs the same sorter
//! twice: once on the detection times as recorded (prompts) and once with
//! a fixed offset added to every time (delayeds). Both passes emit the
//! original detection times. Applied uniformly, the offset preserves every
//! pairwise time difference, so the two passes select the same pairs;
//! decorrelating the delayed stream requires shifting one detector branch
//! upstream of this tool.

use petsort_core::{CoincidenceBatch, Result, SinglesBatch};

use crate::sorter::{sort_coincidences, SortConfig};

/// Default delay applied to the delayed pass (ns).
pub const DEFAULT_DELAY_OFFSET_NS: f64 = 500.0;

/// Result of a combined prompt and delayed sorting run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptDelayed {
    /// Pairs from the unshifted pass.
    pub prompt: CoincidenceBatch,
    /// Pairs from the delayed pass.
    pub delayed: CoincidenceBatch,
}

/// Runs a prompt pass and a delayed pass over the same singles.
///
/// # Errors
///
/// Returns an error if either pass rejects the configuration or the batch
/// fails validation.
pub fn sort_prompt_and_delayed(
    singles: &SinglesBatch,
    time_window_ns: f64,
    delay_offset_ns: f64,
) -> Result<PromptDelayed> {
    let prompt_config = SortConfig::default().with_time_window_ns(time_window_ns);
    let delayed_config = prompt_config.with_offset_ns(delay_offset_ns);

    Ok(PromptDelayed {
        prompt: sort_coincidences(singles, &prompt_config)?,
        delayed: sort_coincidences(singles, &delayed_config)?,
    })
}
