//! Structure of Arrays (`SoA`) types for efficient processing.
//!
//! Singles and coincidences are stored in parallel vectors rather than as
//! arrays of structs. This mirrors the columnar layout of the on-disk
//! tables and keeps the time-ordered scan cache friendly.

use crate::coincidence::{Coincidence, Provenance};
use crate::error::{Error, Result};
use crate::single::{Position, Single, VolumeId};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A batch of single detection events in `SoA` format.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SinglesBatch {
    /// Columnar storage for detection times (ns).
    pub time_ns: Vec<f64>,
    /// Columnar storage for decay event ids.
    pub event_id: Vec<i32>,
    /// Columnar storage for deposited energies (MeV).
    pub energy: Vec<f64>,
    /// Columnar storage for interaction X coordinates (mm).
    pub pos_x: Vec<f64>,
    /// Columnar storage for interaction Y coordinates (mm).
    pub pos_y: Vec<f64>,
    /// Columnar storage for interaction Z coordinates (mm).
    pub pos_z: Vec<f64>,
    /// Columnar storage for detector volume ids.
    pub volume: Vec<VolumeId>,
    /// Columnar storage for track ids.
    pub track_id: Vec<i32>,
    /// Columnar storage for run ids.
    pub run_id: Vec<i32>,
}

impl SinglesBatch {
    /// Creates a new empty batch with specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            time_ns: Vec::with_capacity(capacity),
            event_id: Vec::with_capacity(capacity),
            energy: Vec::with_capacity(capacity),
            pos_x: Vec::with_capacity(capacity),
            pos_y: Vec::with_capacity(capacity),
            pos_z: Vec::with_capacity(capacity),
            volume: Vec::with_capacity(capacity),
            track_id: Vec::with_capacity(capacity),
            run_id: Vec::with_capacity(capacity),
        }
    }

    /// Returns the number of singles in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.time_ns.len()
    }

    /// Returns true if the batch is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.time_ns.is_empty()
    }

    /// Clears all vectors in the batch.
    pub fn clear(&mut self) {
        self.time_ns.clear();
        self.event_id.clear();
        self.energy.clear();
        self.pos_x.clear();
        self.pos_y.clear();
        self.pos_z.clear();
        self.volume.clear();
        self.track_id.clear();
        self.run_id.clear();
    }

    /// Appends all singles from another batch to this one.
    pub fn append(&mut self, other: &SinglesBatch) {
        self.time_ns.extend_from_slice(&other.time_ns);
        self.event_id.extend_from_slice(&other.event_id);
        self.energy.extend_from_slice(&other.energy);
        self.pos_x.extend_from_slice(&other.pos_x);
        self.pos_y.extend_from_slice(&other.pos_y);
        self.pos_z.extend_from_slice(&other.pos_z);
        self.volume.extend_from_slice(&other.volume);
        self.track_id.extend_from_slice(&other.track_id);
        self.run_id.extend_from_slice(&other.run_id);
    }

    /// Pushes a single event into the batch.
    pub fn push(&mut self, single: Single) {
        self.time_ns.push(single.time_ns);
        self.event_id.push(single.event_id);
        self.energy.push(single.energy);
        self.pos_x.push(single.position.x);
        self.pos_y.push(single.position.y);
        self.pos_z.push(single.position.z);
        self.volume.push(single.volume);
        self.track_id.push(single.track_id);
        self.run_id.push(single.run_id);
    }

    /// Reassembles the single at `index`, if it exists.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Single> {
        if index >= self.len() {
            return None;
        }
        Some(Single {
            time_ns: self.time_ns[index],
            event_id: self.event_id[index],
            energy: self.energy[index],
            position: Position::new(self.pos_x[index], self.pos_y[index], self.pos_z[index]),
            volume: self.volume[index],
            track_id: self.track_id[index],
            run_id: self.run_id[index],
        })
    }

    /// Checks that all columns have equal length and all times are finite.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ColumnLengthMismatch`] if any column length differs
    /// from the time column, or [`Error::NonFiniteTime`] if a detection time
    /// is NaN or infinite.
    pub fn validate(&self) -> Result<()> {
        let expected = self.time_ns.len();
        let columns: [(&'static str, usize); 8] = [
            ("event_id", self.event_id.len()),
            ("energy", self.energy.len()),
            ("pos_x", self.pos_x.len()),
            ("pos_y", self.pos_y.len()),
            ("pos_z", self.pos_z.len()),
            ("volume", self.volume.len()),
            ("track_id", self.track_id.len()),
            ("run_id", self.run_id.len()),
        ];
        for (column, actual) in columns {
            if actual != expected {
                return Err(Error::ColumnLengthMismatch {
                    column,
                    expected,
                    actual,
                });
            }
        }
        for (index, t) in self.time_ns.iter().enumerate() {
            if !t.is_finite() {
                return Err(Error::NonFiniteTime { index });
            }
        }
        Ok(())
    }
}

/// A batch of coincidence pairs in `SoA` format.
///
/// Column names follow the conventional coincidence table layout, with
/// side 1 and side 2 columns for every per-single quantity and a shared
/// run id per pair.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CoincidenceBatch {
    /// Detection times of side 1 (ns).
    pub time1_ns: Vec<f64>,
    /// Detection times of side 2 (ns).
    pub time2_ns: Vec<f64>,
    /// Decay event ids of side 1.
    pub event_id1: Vec<i32>,
    /// Decay event ids of side 2.
    pub event_id2: Vec<i32>,
    /// Deposited energies of side 1 (MeV).
    pub energy1: Vec<f64>,
    /// Deposited energies of side 2 (MeV).
    pub energy2: Vec<f64>,
    /// X coordinates of side 1 (mm).
    pub pos_x1: Vec<f64>,
    /// Y coordinates of side 1 (mm).
    pub pos_y1: Vec<f64>,
    /// Z coordinates of side 1 (mm).
    pub pos_z1: Vec<f64>,
    /// X coordinates of side 2 (mm).
    pub pos_x2: Vec<f64>,
    /// Y coordinates of side 2 (mm).
    pub pos_y2: Vec<f64>,
    /// Z coordinates of side 2 (mm).
    pub pos_z2: Vec<f64>,
    /// Detector volumes of side 1.
    pub volume1: Vec<VolumeId>,
    /// Detector volumes of side 2.
    pub volume2: Vec<VolumeId>,
    /// Run id of each pair.
    pub run_id: Vec<i32>,
    /// Track ids of side 1.
    pub track_id1: Vec<i32>,
    /// Track ids of side 2.
    pub track_id2: Vec<i32>,
    /// Compton scatter counts of side 1.
    pub compton_phantom1: Vec<i32>,
    /// Compton scatter counts of side 2.
    pub compton_phantom2: Vec<i32>,
    /// Rayleigh scatter counts of side 1.
    pub rayleigh_phantom1: Vec<i32>,
    /// Rayleigh scatter counts of side 2.
    pub rayleigh_phantom2: Vec<i32>,
    /// Source ids of side 1.
    pub source_id1: Vec<i32>,
    /// Source ids of side 2.
    pub source_id2: Vec<i32>,
}

impl CoincidenceBatch {
    /// Creates a new empty batch with specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            time1_ns: Vec::with_capacity(capacity),
            time2_ns: Vec::with_capacity(capacity),
            event_id1: Vec::with_capacity(capacity),
            event_id2: Vec::with_capacity(capacity),
            energy1: Vec::with_capacity(capacity),
            energy2: Vec::with_capacity(capacity),
            pos_x1: Vec::with_capacity(capacity),
            pos_y1: Vec::with_capacity(capacity),
            pos_z1: Vec::with_capacity(capacity),
            pos_x2: Vec::with_capacity(capacity),
            pos_y2: Vec::with_capacity(capacity),
            pos_z2: Vec::with_capacity(capacity),
            volume1: Vec::with_capacity(capacity),
            volume2: Vec::with_capacity(capacity),
            run_id: Vec::with_capacity(capacity),
            track_id1: Vec::with_capacity(capacity),
            track_id2: Vec::with_capacity(capacity),
            compton_phantom1: Vec::with_capacity(capacity),
            compton_phantom2: Vec::with_capacity(capacity),
            rayleigh_phantom1: Vec::with_capacity(capacity),
            rayleigh_phantom2: Vec::with_capacity(capacity),
            source_id1: Vec::with_capacity(capacity),
            source_id2: Vec::with_capacity(capacity),
        }
    }

    /// Returns the number of pairs in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.time1_ns.len()
    }

    /// Returns true if the batch is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.time1_ns.is_empty()
    }

    /// Clears all vectors in the batch.
    pub fn clear(&mut self) {
        self.time1_ns.clear();
        self.time2_ns.clear();
        self.event_id1.clear();
        self.event_id2.clear();
        self.energy1.clear();
        self.energy2.clear();
        self.pos_x1.clear();
        self.pos_y1.clear();
        self.pos_z1.clear();
        self.pos_x2.clear();
        self.pos_y2.clear();
        self.pos_z2.clear();
        self.volume1.clear();
        self.volume2.clear();
        self.run_id.clear();
        self.track_id1.clear();
        self.track_id2.clear();
        self.compton_phantom1.clear();
        self.compton_phantom2.clear();
        self.rayleigh_phantom1.clear();
        self.rayleigh_phantom2.clear();
        self.source_id1.clear();
        self.source_id2.clear();
    }

    /// Appends all pairs from another batch to this one.
    pub fn append(&mut self, other: &CoincidenceBatch) {
        self.time1_ns.extend_from_slice(&other.time1_ns);
        self.time2_ns.extend_from_slice(&other.time2_ns);
        self.event_id1.extend_from_slice(&other.event_id1);
        self.event_id2.extend_from_slice(&other.event_id2);
        self.energy1.extend_from_slice(&other.energy1);
        self.energy2.extend_from_slice(&other.energy2);
        self.pos_x1.extend_from_slice(&other.pos_x1);
        self.pos_y1.extend_from_slice(&other.pos_y1);
        self.pos_z1.extend_from_slice(&other.pos_z1);
        self.pos_x2.extend_from_slice(&other.pos_x2);
        self.pos_y2.extend_from_slice(&other.pos_y2);
        self.pos_z2.extend_from_slice(&other.pos_z2);
        self.volume1.extend_from_slice(&other.volume1);
        self.volume2.extend_from_slice(&other.volume2);
        self.run_id.extend_from_slice(&other.run_id);
        self.track_id1.extend_from_slice(&other.track_id1);
        self.track_id2.extend_from_slice(&other.track_id2);
        self.compton_phantom1.extend_from_slice(&other.compton_phantom1);
        self.compton_phantom2.extend_from_slice(&other.compton_phantom2);
        self.rayleigh_phantom1.extend_from_slice(&other.rayleigh_phantom1);
        self.rayleigh_phantom2.extend_from_slice(&other.rayleigh_phantom2);
        self.source_id1.extend_from_slice(&other.source_id1);
        self.source_id2.extend_from_slice(&other.source_id2);
    }

    /// Pushes one coincidence pair into the batch.
    pub fn push(&mut self, pair: Coincidence) {
        self.time1_ns.push(pair.time1_ns);
        self.time2_ns.push(pair.time2_ns);
        self.event_id1.push(pair.event_id1);
        self.event_id2.push(pair.event_id2);
        self.energy1.push(pair.energy1);
        self.energy2.push(pair.energy2);
        self.pos_x1.push(pair.position1.x);
        self.pos_y1.push(pair.position1.y);
        self.pos_z1.push(pair.position1.z);
        self.pos_x2.push(pair.position2.x);
        self.pos_y2.push(pair.position2.y);
        self.pos_z2.push(pair.position2.z);
        self.volume1.push(pair.volume1);
        self.volume2.push(pair.volume2);
        self.run_id.push(pair.run_id);
        self.track_id1.push(pair.track_id1);
        self.track_id2.push(pair.track_id2);
        self.compton_phantom1.push(pair.provenance1.compton_phantom());
        self.compton_phantom2.push(pair.provenance2.compton_phantom());
        self.rayleigh_phantom1.push(pair.provenance1.rayleigh_phantom());
        self.rayleigh_phantom2.push(pair.provenance2.rayleigh_phantom());
        self.source_id1.push(pair.provenance1.source_id());
        self.source_id2.push(pair.provenance2.source_id());
    }

    /// Reassembles the pair at `index`, if it exists.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Coincidence> {
        if index >= self.len() {
            return None;
        }
        Some(Coincidence {
            time1_ns: self.time1_ns[index],
            time2_ns: self.time2_ns[index],
            event_id1: self.event_id1[index],
            event_id2: self.event_id2[index],
            energy1: self.energy1[index],
            energy2: self.energy2[index],
            position1: Position::new(self.pos_x1[index], self.pos_y1[index], self.pos_z1[index]),
            position2: Position::new(self.pos_x2[index], self.pos_y2[index], self.pos_z2[index]),
            volume1: self.volume1[index],
            volume2: self.volume2[index],
            run_id: self.run_id[index],
            track_id1: self.track_id1[index],
            track_id2: self.track_id2[index],
            provenance1: Provenance::from_wire(
                self.compton_phantom1[index],
                self.rayleigh_phantom1[index],
                self.source_id1[index],
            ),
            provenance2: Provenance::from_wire(
                self.compton_phantom2[index],
                self.rayleigh_phantom2[index],
                self.source_id2[index],
            ),
        })
    }

    /// Checks that all columns have equal length.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ColumnLengthMismatch`] if any column length differs
    /// from the side 1 time column.
    pub fn validate(&self) -> Result<()> {
        let expected = self.time1_ns.len();
        let columns: [(&'static str, usize); 22] = [
            ("time2_ns", self.time2_ns.len()),
            ("event_id1", self.event_id1.len()),
            ("event_id2", self.event_id2.len()),
            ("energy1", self.energy1.len()),
            ("energy2", self.energy2.len()),
            ("pos_x1", self.pos_x1.len()),
            ("pos_y1", self.pos_y1.len()),
            ("pos_z1", self.pos_z1.len()),
            ("pos_x2", self.pos_x2.len()),
            ("pos_y2", self.pos_y2.len()),
            ("pos_z2", self.pos_z2.len()),
            ("volume1", self.volume1.len()),
            ("volume2", self.volume2.len()),
            ("run_id", self.run_id.len()),
            ("track_id1", self.track_id1.len()),
            ("track_id2", self.track_id2.len()),
            ("compton_phantom1", self.compton_phantom1.len()),
            ("compton_phantom2", self.compton_phantom2.len()),
            ("rayleigh_phantom1", self.rayleigh_phantom1.len()),
            ("rayleigh_phantom2", self.rayleigh_phantom2.len()),
            ("source_id1", self.source_id1.len()),
            ("source_id2", self.source_id2.len()),
        ];
        for (column, actual) in columns {
            if actual != expected {
                return Err(Error::ColumnLengthMismatch {
                    column,
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }
}
