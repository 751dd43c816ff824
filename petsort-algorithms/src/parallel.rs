//! Parallel coincidence sorting using rayon.
//!
//! The time-ordered scan is embarrassingly parallel over window openers:
//! each opener only reads forward in the sorted view, so splitting the
//! opener range across threads and concatenating the per-chunk results in
//! range order reproduces the serial output exactly.

use rayon::prelude::*;

use petsort_core::{CoincidenceBatch, Result, SinglesBatch};

use crate::sorter::{find_partner, pair_singles, shifted_order, SortConfig};

/// Smallest opener range worth handing to a thread.
const MIN_CHUNK: usize = 16_384;

/// Sorts a batch of singles into coincidence pairs across all rayon
/// threads.
///
/// Output is identical to [`sort_coincidences`](crate::sort_coincidences):
/// every window opener scans the same sorted view it would scan serially,
/// and chunk results are concatenated in opener order.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the batch fails
/// validation (ragged columns or non-finite times).
pub fn par_sort_coincidences(
    singles: &SinglesBatch,
    config: &SortConfig,
) -> Result<CoincidenceBatch> {
    config.validate()?;
    singles.validate()?;

    let n = singles.len();
    if n < 2 {
        return Ok(CoincidenceBatch::default());
    }

    let (order, shifted) = shifted_order(&singles.time_ns, config.offset_ns);
    let total = n - 1;
    let threads = rayon::current_num_threads().max(1);
    let chunk_len = total.div_ceil(threads).max(MIN_CHUNK);
    let starts: Vec<usize> = (0..total).step_by(chunk_len).collect();

    let chunks: Vec<CoincidenceBatch> = starts
        .par_iter()
        .map(|&start| {
            let end = (start + chunk_len).min(total);
            let mut local = CoincidenceBatch::default();
            for i in start..end {
                if let Some(j) =
                    find_partner(&singles.volume, &order, &shifted, config.time_window_ns, i)
                {
                    local.push(pair_singles(singles, order[i], order[j]));
                }
            }
            local
        })
        .collect();

    let found = chunks.iter().map(CoincidenceBatch::len).sum();
    let mut out = CoincidenceBatch::with_capacity(found);
    for chunk in &chunks {
        out.append(chunk);
    }
    Ok(out)
}
