//! Text output for coincidence tables.

use crate::{Error, Result};
use petsort_core::{CoincidenceBatch, VolumeId, VolumeTable};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const CSV_HEADER: &str = "time1,time2,eventID1,eventID2,energy1,energy2,\
globalPosX1,globalPosY1,globalPosZ1,globalPosX2,globalPosY2,globalPosZ2,\
volumeID1,volumeID2,runID,trackID1,trackID2,\
comptonPhantom1,comptonPhantom2,RayleighPhantom1,RayleighPhantom2,sourceID1,sourceID2";

/// Writer for coincidence CSV output.
///
/// Column order matches the HDF5 coincidence table; volume ids are
/// resolved back to their path strings.
pub struct CoincidenceFileWriter {
    writer: BufWriter<File>,
}

impl CoincidenceFileWriter {
    /// Creates a new file writer.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        Ok(Self { writer })
    }

    /// Writes a coincidence batch as CSV.
    ///
    /// # Errors
    /// Returns an error if the batch fails validation, a volume id has no
    /// entry in `volumes`, or the write fails.
    pub fn write_csv(&mut self, batch: &CoincidenceBatch, volumes: &VolumeTable) -> Result<()> {
        batch.validate()?;
        writeln!(self.writer, "{CSV_HEADER}")?;

        for i in 0..batch.len() {
            let volume1 = resolve(volumes, batch.volume1[i])?;
            let volume2 = resolve(volumes, batch.volume2[i])?;
            writeln!(
                self.writer,
                "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
                batch.time1_ns[i],
                batch.time2_ns[i],
                batch.event_id1[i],
                batch.event_id2[i],
                batch.energy1[i],
                batch.energy2[i],
                batch.pos_x1[i],
                batch.pos_y1[i],
                batch.pos_z1[i],
                batch.pos_x2[i],
                batch.pos_y2[i],
                batch.pos_z2[i],
                volume1,
                volume2,
                batch.run_id[i],
                batch.track_id1[i],
                batch.track_id2[i],
                batch.compton_phantom1[i],
                batch.compton_phantom2[i],
                batch.rayleigh_phantom1[i],
                batch.rayleigh_phantom2[i],
                batch.source_id1[i],
                batch.source_id2[i],
            )?;
        }

        self.writer.flush()?;
        Ok(())
    }

    /// Flushes the writer.
    ///
    /// # Errors
    /// Returns an error if the flush fails.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

fn resolve(volumes: &VolumeTable, id: VolumeId) -> Result<&str> {
    volumes.name(id).ok_or_else(|| {
        Error::InvalidFormat(format!(
            "volume id {} missing from volume table",
            id.as_u32()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use petsort_core::{Coincidence, Position, Provenance};
    use tempfile::NamedTempFile;

    #[test]
    fn test_csv_output() {
        let mut volumes = VolumeTable::new();
        let a = volumes.intern("scanner/block0");
        let b = volumes.intern("scanner/block1");

        let mut batch = CoincidenceBatch::default();
        batch.push(Coincidence {
            time1_ns: 10.5,
            time2_ns: 12.0,
            event_id1: 1,
            event_id2: 1,
            energy1: 0.511,
            energy2: 0.5,
            position1: Position::new(1.0, 2.0, 3.0),
            position2: Position::new(-1.0, -2.0, -3.0),
            volume1: a,
            volume2: b,
            run_id: 0,
            track_id1: 4,
            track_id2: 5,
            provenance1: Provenance::Unknown,
            provenance2: Provenance::Unknown,
        });

        let file = NamedTempFile::new().unwrap();
        let mut writer = CoincidenceFileWriter::create(file.path()).unwrap();
        writer.write_csv(&batch, &volumes).unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("time1,time2,eventID1"));
        assert!(lines[0].ends_with("sourceID1,sourceID2"));
        assert_eq!(
            lines[1],
            "10.5,12,1,1,0.511,0.5,1,2,3,-1,-2,-3,scanner/block0,scanner/block1,0,4,5,0,0,0,0,0,0"
        );
    }

    #[test]
    fn test_unknown_volume_id_rejected() {
        let volumes = VolumeTable::new();
        let mut batch = CoincidenceBatch::default();
        batch.push(Coincidence {
            time1_ns: 0.0,
            time2_ns: 1.0,
            event_id1: 1,
            event_id2: 1,
            energy1: 0.5,
            energy2: 0.5,
            position1: Position::default(),
            position2: Position::default(),
            volume1: VolumeId::new(0),
            volume2: VolumeId::new(1),
            run_id: 0,
            track_id1: 1,
            track_id2: 2,
            provenance1: Provenance::Unknown,
            provenance2: Provenance::Unknown,
        });

        let file = NamedTempFile::new().unwrap();
        let mut writer = CoincidenceFileWriter::create(file.path()).unwrap();
        let err = writer.write_csv(&batch, &volumes).unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(_)));
    }

    #[test]
    fn test_empty_batch_writes_header_only() {
        let file = NamedTempFile::new().unwrap();
        let mut writer = CoincidenceFileWriter::create(file.path()).unwrap();
        writer
            .write_csv(&CoincidenceBatch::default(), &VolumeTable::new())
            .unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(content.lines().count(), 1);
    }
}
