//! Coincidence pairs assembled from single detection events.

use crate::single::{Position, VolumeId};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Physics provenance of one side of a coincidence.
///
/// Scanner simulations that track scatter history report how many Compton
/// and Rayleigh interactions a photon underwent in the phantom, and which
/// source it came from. Pipelines that operate purely on detected singles
/// have no access to that history; their pairs carry [`Provenance::Unknown`],
/// which serializes as zeros on every output surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Provenance {
    /// Scatter history was not tracked.
    #[default]
    Unknown,
    /// Scatter history as reported by the simulation.
    Known {
        /// Number of Compton interactions in the phantom.
        compton_phantom: i32,
        /// Number of Rayleigh interactions in the phantom.
        rayleigh_phantom: i32,
        /// Id of the emitting source.
        source_id: i32,
    },
}

impl Provenance {
    /// Compton interaction count, zero when untracked.
    #[inline]
    #[must_use]
    pub fn compton_phantom(&self) -> i32 {
        match self {
            Self::Unknown => 0,
            Self::Known { compton_phantom, .. } => *compton_phantom,
        }
    }

    /// Rayleigh interaction count, zero when untracked.
    #[inline]
    #[must_use]
    pub fn rayleigh_phantom(&self) -> i32 {
        match self {
            Self::Unknown => 0,
            Self::Known { rayleigh_phantom, .. } => *rayleigh_phantom,
        }
    }

    /// Source id, zero when untracked.
    #[inline]
    #[must_use]
    pub fn source_id(&self) -> i32 {
        match self {
            Self::Unknown => 0,
            Self::Known { source_id, .. } => *source_id,
        }
    }

    /// Reconstructs provenance from serialized counters.
    ///
    /// An all-zero triple is indistinguishable from untracked history and
    /// reads back as [`Provenance::Unknown`].
    #[must_use]
    pub fn from_wire(compton_phantom: i32, rayleigh_phantom: i32, source_id: i32) -> Self {
        if compton_phantom == 0 && rayleigh_phantom == 0 && source_id == 0 {
            Self::Unknown
        } else {
            Self::Known {
                compton_phantom,
                rayleigh_phantom,
                source_id,
            }
        }
    }
}

/// A pair of singles accepted as a coincidence.
///
/// Side 1 is the earlier single in the time-ordered scan; side 2 is its
/// partner. Times are the original detection times, without any delay
/// offset that may have been applied while searching for the pair.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Coincidence {
    /// Detection time of side 1 (ns).
    pub time1_ns: f64,
    /// Detection time of side 2 (ns).
    pub time2_ns: f64,
    /// Decay event id of side 1.
    pub event_id1: i32,
    /// Decay event id of side 2.
    pub event_id2: i32,
    /// Deposited energy of side 1 (MeV).
    pub energy1: f64,
    /// Deposited energy of side 2 (MeV).
    pub energy2: f64,
    /// Interaction position of side 1 (mm).
    pub position1: Position,
    /// Interaction position of side 2 (mm).
    pub position2: Position,
    /// Detector volume of side 1.
    pub volume1: VolumeId,
    /// Detector volume of side 2.
    pub volume2: VolumeId,
    /// Simulation run the pair belongs to.
    pub run_id: i32,
    /// Track id of side 1.
    pub track_id1: i32,
    /// Track id of side 2.
    pub track_id2: i32,
    /// Scatter history of side 1.
    pub provenance1: Provenance,
    /// Scatter history of side 2.
    pub provenance2: Provenance,
}

impl Coincidence {
    /// Absolute time difference between the two sides (ns).
    #[inline]
    #[must_use]
    pub fn time_difference_ns(&self) -> f64 {
        (self.time2_ns - self.time1_ns).abs()
    }

    /// True when both sides come from the same decay event.
    #[inline]
    #[must_use]
    pub fn same_event(&self) -> bool {
        self.event_id1 == self.event_id2
    }
}
