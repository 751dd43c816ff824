//! HDF5 singles and coincidence table I/O.
//!
//! Tables live under `/entry/<group>` with one dataset per column. Singles
//! columns carry the step-level names produced by scanner simulations
//! (`GlobalTime`, `EventID`, ...); coincidence columns use the paired
//! layout (`time1`/`time2`, `eventID1`/`eventID2`, ...). Detector volumes
//! are stored as variable-length path strings and interned into a
//! [`VolumeTable`] on read.

use crate::{Error, Result};
use hdf5::types::{H5Type, VarLenUnicode};
use hdf5::{Dataset, File, Group};
use ndarray::ArrayView1;
use petsort_core::{CoincidenceBatch, SinglesBatch, VolumeId, VolumeTable};
use std::path::Path;
use std::str::FromStr;

const FORMAT_VERSION_ATTR: &str = "petsort_format_version";
const FORMAT_VERSION: &str = "0.1";

/// Default group name for singles tables.
pub const DEFAULT_SINGLES_GROUP: &str = "singles";
/// Default group name for coincidence tables.
pub const DEFAULT_COINCIDENCES_GROUP: &str = "coincidences";

/// A singles table together with its volume dictionary.
#[derive(Clone, Debug, Default)]
pub struct SinglesTable {
    /// The singles columns.
    pub singles: SinglesBatch,
    /// Volume paths referenced by the batch.
    pub volumes: VolumeTable,
}

/// A coincidence table together with its volume dictionary.
#[derive(Clone, Debug, Default)]
pub struct CoincidenceTable {
    /// The coincidence columns.
    pub coincidences: CoincidenceBatch,
    /// Volume paths referenced by the batch.
    pub volumes: VolumeTable,
}

/// Table write configuration.
#[derive(Clone, Debug)]
pub struct TableWriteOptions {
    /// Chunk size for column datasets, in events.
    pub chunk_events: usize,
    /// Deflate level, `None` to store uncompressed.
    pub compression: Option<u8>,
    /// Apply the byte-shuffle filter alongside compression.
    pub shuffle: bool,
}

impl Default for TableWriteOptions {
    fn default() -> Self {
        Self {
            chunk_events: 100_000,
            compression: Some(1),
            shuffle: true,
        }
    }
}

/// Reads a singles table from `/entry/<group>`.
///
/// `RunID` is optional in the input and defaults to zeros; every other
/// column is required.
///
/// # Errors
/// Returns an error if the file or group is missing, a required dataset
/// is absent, or the loaded columns fail validation.
pub fn read_singles_hdf5<P: AsRef<Path>>(path: P, group: &str) -> Result<SinglesTable> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::MissingInput(path.to_path_buf()));
    }
    let file = File::open(path)?;
    let entry = open_group(&file, "entry")?;
    let table = open_group(&entry, group)?;

    let time_ns = read_column::<f64>(&table, group, "GlobalTime")?;
    let event_id = read_column::<i32>(&table, group, "EventID")?;
    let energy = read_column::<f64>(&table, group, "TotalEnergyDeposit")?;
    let pos_x = read_column::<f64>(&table, group, "PostPosition_X")?;
    let pos_y = read_column::<f64>(&table, group, "PostPosition_Y")?;
    let pos_z = read_column::<f64>(&table, group, "PostPosition_Z")?;
    let track_id = read_column::<i32>(&table, group, "TrackID")?;
    let run_id =
        read_column_opt::<i32>(&table, "RunID")?.unwrap_or_else(|| vec![0; time_ns.len()]);

    let mut volumes = VolumeTable::new();
    let volume = read_volume_column(&table, group, "PostStepUniqueVolumeID", &mut volumes)?;

    let singles = SinglesBatch {
        time_ns,
        event_id,
        energy,
        pos_x,
        pos_y,
        pos_z,
        volume,
        track_id,
        run_id,
    };
    singles.validate()?;

    Ok(SinglesTable { singles, volumes })
}

/// Writes a singles table to `/entry/<group>`.
///
/// # Errors
/// Returns an error if the batch fails validation, a volume id has no
/// entry in `volumes`, or HDF5 I/O fails.
pub fn write_singles_hdf5<P: AsRef<Path>>(
    path: P,
    group: &str,
    singles: &SinglesBatch,
    volumes: &VolumeTable,
    options: &TableWriteOptions,
) -> Result<()> {
    singles.validate()?;

    let file = File::create(path)?;
    set_attr_str(&file, FORMAT_VERSION_ATTR, FORMAT_VERSION)?;

    let entry = file.create_group("entry")?;
    set_attr_str(&entry, "NX_class", "NXentry")?;

    let table = entry.create_group(group)?;
    set_attr_str(&table, "NX_class", "NXevent_data")?;

    write_numeric_column(&table, "GlobalTime", &singles.time_ns, Some("ns"), options)?;
    write_numeric_column(&table, "EventID", &singles.event_id, Some("id"), options)?;
    write_numeric_column(
        &table,
        "TotalEnergyDeposit",
        &singles.energy,
        Some("MeV"),
        options,
    )?;
    write_numeric_column(&table, "PostPosition_X", &singles.pos_x, Some("mm"), options)?;
    write_numeric_column(&table, "PostPosition_Y", &singles.pos_y, Some("mm"), options)?;
    write_numeric_column(&table, "PostPosition_Z", &singles.pos_z, Some("mm"), options)?;
    write_volume_column(&table, "PostStepUniqueVolumeID", &singles.volume, volumes)?;
    write_numeric_column(&table, "TrackID", &singles.track_id, Some("id"), options)?;
    write_numeric_column(&table, "RunID", &singles.run_id, Some("id"), options)?;
    Ok(())
}

/// Reads a coincidence table from `/entry/<group>`.
///
/// # Errors
/// Returns an error if the file or group is missing, a dataset is absent,
/// or the loaded columns fail validation.
pub fn read_coincidences_hdf5<P: AsRef<Path>>(path: P, group: &str) -> Result<CoincidenceTable> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::MissingInput(path.to_path_buf()));
    }
    let file = File::open(path)?;
    let entry = open_group(&file, "entry")?;
    let table = open_group(&entry, group)?;

    let mut volumes = VolumeTable::new();
    let coincidences = CoincidenceBatch {
        time1_ns: read_column::<f64>(&table, group, "time1")?,
        time2_ns: read_column::<f64>(&table, group, "time2")?,
        event_id1: read_column::<i32>(&table, group, "eventID1")?,
        event_id2: read_column::<i32>(&table, group, "eventID2")?,
        energy1: read_column::<f64>(&table, group, "energy1")?,
        energy2: read_column::<f64>(&table, group, "energy2")?,
        pos_x1: read_column::<f64>(&table, group, "globalPosX1")?,
        pos_y1: read_column::<f64>(&table, group, "globalPosY1")?,
        pos_z1: read_column::<f64>(&table, group, "globalPosZ1")?,
        pos_x2: read_column::<f64>(&table, group, "globalPosX2")?,
        pos_y2: read_column::<f64>(&table, group, "globalPosY2")?,
        pos_z2: read_column::<f64>(&table, group, "globalPosZ2")?,
        volume1: read_volume_column(&table, group, "volumeID1", &mut volumes)?,
        volume2: read_volume_column(&table, group, "volumeID2", &mut volumes)?,
        run_id: read_column::<i32>(&table, group, "runID")?,
        track_id1: read_column::<i32>(&table, group, "trackID1")?,
        track_id2: read_column::<i32>(&table, group, "trackID2")?,
        compton_phantom1: read_column::<i32>(&table, group, "comptonPhantom1")?,
        compton_phantom2: read_column::<i32>(&table, group, "comptonPhantom2")?,
        rayleigh_phantom1: read_column::<i32>(&table, group, "RayleighPhantom1")?,
        rayleigh_phantom2: read_column::<i32>(&table, group, "RayleighPhantom2")?,
        source_id1: read_column::<i32>(&table, group, "sourceID1")?,
        source_id2: read_column::<i32>(&table, group, "sourceID2")?,
    };
    coincidences.validate()?;

    Ok(CoincidenceTable {
        coincidences,
        volumes,
    })
}

/// Writes a coincidence table to `/entry/<group>`.
///
/// An empty batch still produces a complete table with zero-length
/// columns.
///
/// # Errors
/// Returns an error if the batch fails validation, a volume id has no
/// entry in `volumes`, or HDF5 I/O fails.
pub fn write_coincidences_hdf5<P: AsRef<Path>>(
    path: P,
    group: &str,
    coincidences: &CoincidenceBatch,
    volumes: &VolumeTable,
    options: &TableWriteOptions,
) -> Result<()> {
    coincidences.validate()?;

    let file = File::create(path)?;
    set_attr_str(&file, FORMAT_VERSION_ATTR, FORMAT_VERSION)?;

    let entry = file.create_group("entry")?;
    set_attr_str(&entry, "NX_class", "NXentry")?;

    let table = entry.create_group(group)?;
    set_attr_str(&table, "NX_class", "NXevent_data")?;

    write_numeric_column(&table, "time1", &coincidences.time1_ns, Some("ns"), options)?;
    write_numeric_column(&table, "time2", &coincidences.time2_ns, Some("ns"), options)?;
    write_numeric_column(&table, "eventID1", &coincidences.event_id1, Some("id"), options)?;
    write_numeric_column(&table, "eventID2", &coincidences.event_id2, Some("id"), options)?;
    write_numeric_column(&table, "energy1", &coincidences.energy1, Some("MeV"), options)?;
    write_numeric_column(&table, "energy2", &coincidences.energy2, Some("MeV"), options)?;
    write_numeric_column(&table, "globalPosX1", &coincidences.pos_x1, Some("mm"), options)?;
    write_numeric_column(&table, "globalPosY1", &coincidences.pos_y1, Some("mm"), options)?;
    write_numeric_column(&table, "globalPosZ1", &coincidences.pos_z1, Some("mm"), options)?;
    write_numeric_column(&table, "globalPosX2", &coincidences.pos_x2, Some("mm"), options)?;
    write_numeric_column(&table, "globalPosY2", &coincidences.pos_y2, Some("mm"), options)?;
    write_numeric_column(&table, "globalPosZ2", &coincidences.pos_z2, Some("mm"), options)?;
    write_volume_column(&table, "volumeID1", &coincidences.volume1, volumes)?;
    write_volume_column(&table, "volumeID2", &coincidences.volume2, volumes)?;
    write_numeric_column(&table, "runID", &coincidences.run_id, Some("id"), options)?;
    write_numeric_column(&table, "trackID1", &coincidences.track_id1, Some("id"), options)?;
    write_numeric_column(&table, "trackID2", &coincidences.track_id2, Some("id"), options)?;
    write_numeric_column(
        &table,
        "comptonPhantom1",
        &coincidences.compton_phantom1,
        Some("count"),
        options,
    )?;
    write_numeric_column(
        &table,
        "comptonPhantom2",
        &coincidences.compton_phantom2,
        Some("count"),
        options,
    )?;
    write_numeric_column(
        &table,
        "RayleighPhantom1",
        &coincidences.rayleigh_phantom1,
        Some("count"),
        options,
    )?;
    write_numeric_column(
        &table,
        "RayleighPhantom2",
        &coincidences.rayleigh_phantom2,
        Some("count"),
        options,
    )?;
    write_numeric_column(&table, "sourceID1", &coincidences.source_id1, Some("id"), options)?;
    write_numeric_column(&table, "sourceID2", &coincidences.source_id2, Some("id"), options)?;
    Ok(())
}

fn open_group(parent: &Group, name: &str) -> Result<Group> {
    parent.group(name).map_err(|_| {
        let available = parent.member_names().unwrap_or_default().join(", ");
        Error::MissingGroup {
            group: name.to_string(),
            available,
        }
    })
}

fn read_column<T: H5Type>(group: &Group, group_name: &str, name: &str) -> Result<Vec<T>> {
    let dataset = group.dataset(name).map_err(|_| Error::MissingDataset {
        dataset: name.to_string(),
        group: group_name.to_string(),
    })?;
    Ok(dataset.read_raw::<T>()?)
}

fn read_column_opt<T: H5Type>(group: &Group, name: &str) -> Result<Option<Vec<T>>> {
    match group.dataset(name) {
        Ok(dataset) => Ok(Some(dataset.read_raw::<T>()?)),
        Err(_) => Ok(None),
    }
}

/// Reads a volume column, accepting either path strings or raw integer
/// ids (older exports); both forms are interned into `volumes`.
fn read_volume_column(
    group: &Group,
    group_name: &str,
    name: &str,
    volumes: &mut VolumeTable,
) -> Result<Vec<VolumeId>> {
    let dataset = group.dataset(name).map_err(|_| Error::MissingDataset {
        dataset: name.to_string(),
        group: group_name.to_string(),
    })?;

    if let Ok(values) = dataset.read_raw::<VarLenUnicode>() {
        return Ok(values.iter().map(|path| volumes.intern(path)).collect());
    }

    let values = dataset.read_raw::<i64>()?;
    Ok(values
        .iter()
        .map(|id| volumes.intern(&id.to_string()))
        .collect())
}

fn write_numeric_column<T: H5Type>(
    group: &Group,
    name: &str,
    values: &[T],
    units: Option<&str>,
    options: &TableWriteOptions,
) -> Result<()> {
    let dataset = create_column::<T>(group, name, values.len(), options)?;
    if let Some(units) = units {
        set_dataset_units(&dataset, units)?;
    }
    if !values.is_empty() {
        dataset.write(ArrayView1::from(values))?;
    }
    Ok(())
}

/// Volume paths are variable-length strings; they bypass the chunked
/// compression pipeline and are stored contiguously.
fn write_volume_column(
    group: &Group,
    name: &str,
    ids: &[VolumeId],
    volumes: &VolumeTable,
) -> Result<()> {
    let mut values = Vec::with_capacity(ids.len());
    for id in ids {
        let path = volumes.name(*id).ok_or_else(|| {
            Error::InvalidFormat(format!(
                "volume id {} missing from volume table",
                id.as_u32()
            ))
        })?;
        values.push(to_var_len_unicode(path)?);
    }

    let dataset = group
        .new_dataset::<VarLenUnicode>()
        .shape((values.len(),))
        .create(name)?;
    if !values.is_empty() {
        dataset.write(ArrayView1::from(values.as_slice()))?;
    }
    Ok(())
}

fn create_column<T: H5Type>(
    group: &Group,
    name: &str,
    len: usize,
    options: &TableWriteOptions,
) -> Result<Dataset> {
    let mut builder = group.new_dataset::<T>().shape((len,));

    // Chunking (and therefore filters) requires a non-empty dataset.
    if len > 0 {
        builder = builder.chunk((options.chunk_events.clamp(1, len),));
        if let Some(level) = options.compression {
            builder = builder.deflate(level);
        }
        if options.shuffle && options.compression.is_some() {
            builder = builder.shuffle();
        }
    }

    Ok(builder.create(name)?)
}

fn set_dataset_units(dataset: &Dataset, units: &str) -> Result<()> {
    let value = to_var_len_unicode(units)?;
    dataset
        .new_attr::<VarLenUnicode>()
        .create("units")?
        .write_scalar(&value)?;
    Ok(())
}

fn set_attr_str(group: &Group, name: &str, value: &str) -> Result<()> {
    let value = to_var_len_unicode(value)?;
    group
        .new_attr::<VarLenUnicode>()
        .create(name)?
        .write_scalar(&value)?;
    Ok(())
}

fn to_var_len_unicode(value: &str) -> Result<VarLenUnicode> {
    VarLenUnicode::from_str(value)
        .map_err(|e| Error::InvalidFormat(format!("invalid utf-8 attribute: {e}")))
}
