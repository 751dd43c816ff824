//! Single detection events and detector volume identifiers.
//!
//! A *single* is one energy deposit recorded by the scanner model during a
//! simulation run. Detector volumes are identified by hierarchical path
//! strings in the input data; [`VolumeTable`] interns those strings so that
//! the hot sorting path compares compact [`VolumeId`] values instead.

use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Compact identifier for a detector volume.
///
/// Ids are dense indices assigned in first-seen order by a [`VolumeTable`].
/// Two singles deposited in the same physical volume always carry the same
/// id, so volume equality is a single integer compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VolumeId(pub u32);

impl VolumeId {
    /// Creates a volume id from a raw index.
    #[inline]
    #[must_use]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw index.
    #[inline]
    #[must_use]
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

/// Bidirectional mapping between volume path strings and [`VolumeId`]s.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VolumeTable {
    names: Vec<String>,
    index: HashMap<String, VolumeId>,
}

impl VolumeTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id for `name`, assigning the next free id on first sight.
    #[allow(clippy::cast_possible_truncation)]
    pub fn intern(&mut self, name: &str) -> VolumeId {
        if let Some(&id) = self.index.get(name) {
            return id;
        }
        let id = VolumeId::new(self.names.len() as u32);
        self.names.push(name.to_owned());
        self.index.insert(name.to_owned(), id);
        id
    }

    /// Returns the path string for an id, if the id is known.
    #[must_use]
    pub fn name(&self, id: VolumeId) -> Option<&str> {
        self.names.get(id.as_u32() as usize).map(String::as_str)
    }

    /// Returns the id for a path string, if it has been interned.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<VolumeId> {
        self.index.get(name).copied()
    }

    /// Number of distinct volumes seen so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if no volume has been interned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterates over path strings in id order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

/// Interaction position in the scanner frame, in millimeters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Position {
    /// X coordinate (mm).
    pub x: f64,
    /// Y coordinate (mm).
    pub y: f64,
    /// Z coordinate (mm).
    pub z: f64,
}

impl Position {
    /// Creates a position from coordinates in millimeters.
    #[inline]
    #[must_use]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// One single detection event.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Single {
    /// Detection time in nanoseconds since the start of the run.
    pub time_ns: f64,
    /// Id of the decay event that produced this single.
    pub event_id: i32,
    /// Deposited energy in MeV.
    pub energy: f64,
    /// Interaction position (mm).
    pub position: Position,
    /// Detector volume the deposit occurred in.
    pub volume: VolumeId,
    /// Id of the particle track that made the deposit.
    pub track_id: i32,
    /// Simulation run the single belongs to.
    pub run_id: i32,
}

impl Single {
    /// Creates a single from its fields.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        time_ns: f64,
        event_id: i32,
        energy: f64,
        position: Position,
        volume: VolumeId,
        track_id: i32,
        run_id: i32,
    ) -> Self {
        Self {
            time_ns,
            event_id,
            energy,
            position,
            volume,
            track_id,
            run_id,
        }
    }
}
