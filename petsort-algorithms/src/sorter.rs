//! Time-window coincidence sorting.
//!
//! Key characteristics:
//! - Every single opens a window; the scan advances one record at a time
//! - Partner search stops at the first record outside the window
//! - Records in the same detector volume never pair, but are scanned past
//! - A single may appear in more than one pair
//!
//! Singles are ordered by detection time before scanning. An optional
//! offset is added to every time first, which is how delayed passes for
//! randoms estimation are produced; emitted pairs always carry the
//! original, unshifted times.

use petsort_core::{
    Coincidence, CoincidenceBatch, Error, Position, Provenance, Result, SinglesBatch, VolumeId,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default coincidence time window (ns).
pub const DEFAULT_TIME_WINDOW_NS: f64 = 120.0;

/// Configuration for one sorting pass.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SortConfig {
    /// Maximum time difference for two singles to pair (ns). Inclusive.
    pub time_window_ns: f64,
    /// Offset added to every detection time before ordering (ns).
    pub offset_ns: f64,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            time_window_ns: DEFAULT_TIME_WINDOW_NS,
            offset_ns: 0.0,
        }
    }
}

impl SortConfig {
    /// Sets the coincidence time window in nanoseconds.
    #[must_use]
    pub fn with_time_window_ns(mut self, time_window_ns: f64) -> Self {
        self.time_window_ns = time_window_ns;
        self
    }

    /// Sets the time offset in nanoseconds.
    #[must_use]
    pub fn with_offset_ns(mut self, offset_ns: f64) -> Self {
        self.offset_ns = offset_ns;
        self
    }

    /// Checks that the window and offset are usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTimeWindow`] if the window is negative or
    /// non-finite, and [`Error::InvalidTimeOffset`] if the offset is
    /// non-finite.
    pub fn validate(&self) -> Result<()> {
        if !self.time_window_ns.is_finite() || self.time_window_ns < 0.0 {
            return Err(Error::InvalidTimeWindow(self.time_window_ns));
        }
        if !self.offset_ns.is_finite() {
            return Err(Error::InvalidTimeOffset(self.offset_ns));
        }
        Ok(())
    }
}

/// Progress snapshot reported during a sorting pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortProgress {
    /// Window openers processed so far.
    pub processed: usize,
    /// Total window openers in this pass.
    pub total: usize,
    /// Coincidences found so far.
    pub found: usize,
}

/// Sorts a batch of singles into coincidence pairs.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the batch fails
/// validation (ragged columns or non-finite times).
pub fn sort_coincidences(singles: &SinglesBatch, config: &SortConfig) -> Result<CoincidenceBatch> {
    sort_coincidences_with_progress(singles, config, 0, |_| {})
}

/// Sorts a batch of singles into coincidence pairs, reporting progress.
///
/// `on_progress` is invoked after every `progress_every` window openers;
/// pass zero to disable reporting. Batches with fewer than two singles
/// produce an empty result.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the batch fails
/// validation (ragged columns or non-finite times).
pub fn sort_coincidences_with_progress<F>(
    singles: &SinglesBatch,
    config: &SortConfig,
    progress_every: usize,
    mut on_progress: F,
) -> Result<CoincidenceBatch>
where
    F: FnMut(SortProgress),
{
    config.validate()?;
    singles.validate()?;

    let n = singles.len();
    if n < 2 {
        return Ok(CoincidenceBatch::default());
    }

    let (order, shifted) = shifted_order(&singles.time_ns, config.offset_ns);
    let total = n - 1;
    let mut out = CoincidenceBatch::default();

    for i in 0..total {
        if let Some(j) =
            find_partner(&singles.volume, &order, &shifted, config.time_window_ns, i)
        {
            out.push(pair_singles(singles, order[i], order[j]));
        }
        if progress_every != 0 && (i + 1) % progress_every == 0 {
            on_progress(SortProgress {
                processed: i + 1,
                total,
                found: out.len(),
            });
        }
    }

    Ok(out)
}

/// Computes the time-ascending ordering of `times_ns + offset_ns`.
///
/// Returns the permutation of record indices and the shifted times laid
/// out in that order. The sort is stable, so equal timestamps keep their
/// input order.
pub(crate) fn shifted_order(times_ns: &[f64], offset_ns: f64) -> (Vec<usize>, Vec<f64>) {
    let mut order: Vec<usize> = (0..times_ns.len()).collect();
    order.sort_by(|&a, &b| (times_ns[a] + offset_ns).total_cmp(&(times_ns[b] + offset_ns)));
    let shifted: Vec<f64> = order.iter().map(|&idx| times_ns[idx] + offset_ns).collect();
    (order, shifted)
}

/// Scans forward from sorted position `i` for the first record that falls
/// inside the window and sits in a different detector volume.
///
/// Returns the sorted position of the partner, or `None` when the window
/// closes first.
pub(crate) fn find_partner(
    volumes: &[VolumeId],
    order: &[usize],
    shifted: &[f64],
    time_window_ns: f64,
    i: usize,
) -> Option<usize> {
    let t1 = shifted[i];
    let v1 = volumes[order[i]];
    for j in (i + 1)..order.len() {
        if (shifted[j] - t1).abs() > time_window_ns {
            return None;
        }
        if volumes[order[j]] != v1 {
            return Some(j);
        }
        // Same volume inside the window: a later record may still qualify.
    }
    None
}

/// Assembles a pair from two record indices, `first` being the window
/// opener. Times are taken from the unshifted time column.
pub(crate) fn pair_singles(singles: &SinglesBatch, first: usize, second: usize) -> Coincidence {
    Coincidence {
        time1_ns: singles.time_ns[first],
        time2_ns: singles.time_ns[second],
        event_id1: singles.event_id[first],
        event_id2: singles.event_id[second],
        energy1: singles.energy[first],
        energy2: singles.energy[second],
        position1: Position::new(
            singles.pos_x[first],
            singles.pos_y[first],
            singles.pos_z[first],
        ),
        position2: Position::new(
            singles.pos_x[second],
            singles.pos_y[second],
            singles.pos_z[second],
        ),
        volume1: singles.volume[first],
        volume2: singles.volume[second],
        run_id: singles.run_id[first],
        track_id1: singles.track_id[first],
        track_id2: singles.track_id[second],
        provenance1: Provenance::Unknown,
        provenance2: Provenance::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shifted_order_is_stable_for_ties() {
        let times = [5.0, 1.0, 5.0, 3.0];
        let (order, shifted) = shifted_order(&times, 0.0);
        assert_eq!(order, vec![1, 3, 0, 2]);
        assert_eq!(shifted, vec![1.0, 3.0, 5.0, 5.0]);
    }

    #[test]
    fn shifted_order_applies_offset() {
        let times = [10.0, 20.0];
        let (order, shifted) = shifted_order(&times, 500.0);
        assert_eq!(order, vec![0, 1]);
        assert_eq!(shifted, vec![510.0, 520.0]);
    }

    #[test]
    fn find_partner_skips_same_volume_and_stops_at_window() {
        let volumes = [VolumeId::new(0), VolumeId::new(0), VolumeId::new(1)];
        let order = [0, 1, 2];

        // Partner two positions ahead, same-volume record in between.
        let shifted = [0.0, 50.0, 100.0];
        assert_eq!(find_partner(&volumes, &order, &shifted, 120.0, 0), Some(2));

        // Window closes before a different volume turns up.
        let shifted = [0.0, 50.0, 500.0];
        assert_eq!(find_partner(&volumes, &order, &shifted, 120.0, 0), None);
    }

    #[test]
    fn window_edge_is_inclusive() {
        let volumes = [VolumeId::new(0), VolumeId::new(1)];
        let order = [0, 1];
        let shifted = [0.0, 120.0];
        assert_eq!(find_partner(&volumes, &order, &shifted, 120.0, 0), Some(1));

        let shifted = [0.0, 120.1];
        assert_eq!(find_partner(&volumes, &order, &shifted, 120.0, 0), None);
    }

    #[test]
    fn config_validation() {
        assert!(SortConfig::default().validate().is_ok());
        assert!(matches!(
            SortConfig::default().with_time_window_ns(-1.0).validate(),
            Err(Error::InvalidTimeWindow(_))
        ));
        assert!(matches!(
            SortConfig::default().with_time_window_ns(f64::NAN).validate(),
            Err(Error::InvalidTimeWindow(_))
        ));
        assert!(matches!(
            SortConfig::default().with_offset_ns(f64::INFINITY).validate(),
            Err(Error::InvalidTimeOffset(_))
        ));
        // Negative offsets shift times backwards, which is fine.
        assert!(SortConfig::default().with_offset_ns(-500.0).validate().is_ok());
    }
}
