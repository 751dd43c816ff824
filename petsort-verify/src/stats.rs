//! Simulation run statistics: parsing and comparison.
//!
//! Statistics actors write one `# key = value` line per quantity:
//!
//! ```text
//! # NumberOfRun    = 1
//! # NumberOfEvents = 250000
//! # NumberOfTracks = 1606043
//! # NumberOfSteps  = 8549402
//! # PPS (Primary per sec)      = 10318.2
//! ```
//!
//! Counter comparisons are relative: simulations are stochastic, so
//! event, track, and step counts only need to agree within a tolerance.
//! Run counts must match exactly.
#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::float_cmp
)]

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Error, Result};
use crate::report::{Check, Report};

/// One parsed statistics entry.
#[derive(Debug, Clone, PartialEq)]
pub enum StatValue {
    /// Integer entry (counters).
    Int(i64),
    /// Floating point entry (rates).
    Float(f64),
    /// Anything that is not a number (dates, units).
    Text(String),
}

impl StatValue {
    /// Integer view of the entry; text reads as zero.
    #[must_use]
    pub fn as_i64(&self) -> i64 {
        match self {
            Self::Int(value) => *value,
            Self::Float(value) => *value as i64,
            Self::Text(_) => 0,
        }
    }

    /// Float view of the entry; text reads as zero.
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        match self {
            Self::Int(value) => *value as f64,
            Self::Float(value) => *value,
            Self::Text(_) => 0.0,
        }
    }
}

/// Statistics reported by a simulation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimStats {
    /// Number of runs.
    pub runs: i64,
    /// Number of primary events.
    pub events: i64,
    /// Number of particle tracks.
    pub tracks: i64,
    /// Number of simulation steps.
    pub steps: i64,
    /// Primaries per second.
    pub pps: f64,
    /// Tracks per second.
    pub tps: f64,
    /// Steps per second.
    pub sps: f64,
    /// Every entry found in the file, keyed by name.
    pub raw: BTreeMap<String, StatValue>,
}

/// Reads and parses a statistics file.
///
/// # Errors
///
/// Returns [`Error::MissingStatsFile`] if the path does not exist and
/// [`Error::MalformedStatsFile`] if no `# key = value` entry is found.
pub fn read_stats_file<P: AsRef<Path>>(path: P) -> Result<SimStats> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::MissingStatsFile(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)?;
    let stats = parse_stats(&content);
    if stats.raw.is_empty() {
        return Err(Error::MalformedStatsFile(path.to_path_buf()));
    }
    Ok(stats)
}

/// Parses statistics from file content.
///
/// Lines not starting with `#` or without a `=` are ignored. Values with
/// a decimal point parse as floats, others as integers; anything
/// unparsable is kept as text.
#[must_use]
pub fn parse_stats(content: &str) -> SimStats {
    let mut stats = SimStats::default();
    for line in content.lines() {
        let Some(rest) = line.trim_start().strip_prefix('#') else {
            continue;
        };
        let Some((key, value)) = rest.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let value = parse_value(value.trim());

        match key {
            "NumberOfRun" => stats.runs = value.as_i64(),
            "NumberOfEvents" => stats.events = value.as_i64(),
            "NumberOfTracks" => stats.tracks = value.as_i64(),
            "NumberOfSteps" => stats.steps = value.as_i64(),
            "PPS (Primary per sec)" => stats.pps = value.as_f64(),
            "TPS (Track per sec)" => stats.tps = value.as_f64(),
            "SPS (Step per sec)" => stats.sps = value.as_f64(),
            _ => {}
        }
        stats.raw.insert(key.to_string(), value);
    }
    stats
}

fn parse_value(value: &str) -> StatValue {
    if value.contains('.') {
        if let Ok(float) = value.parse::<f64>() {
            return StatValue::Float(float);
        }
    } else if let Ok(int) = value.parse::<i64>() {
        return StatValue::Int(int);
    }
    StatValue::Text(value.to_string())
}

/// Relative difference of `test` against `reference`, in percent.
///
/// A zero reference makes any deviation total, reported as 100%.
#[must_use]
pub fn relative_difference_percent(test: f64, reference: f64) -> f64 {
    if reference == 0.0 {
        100.0
    } else {
        test / reference * 100.0 - 100.0
    }
}

/// Compares run statistics against a reference.
///
/// Run counts must match exactly. Event, track, and step counts pass when
/// their relative difference stays within `tolerance` (a fraction: 0.1
/// allows 10%).
#[must_use]
pub fn compare_stats(test: &SimStats, reference: &SimStats, tolerance: f64) -> Report {
    let mut report = Report::new();

    report.push(Check::new(
        "Runs",
        test.runs == reference.runs,
        format!("{} {}", test.runs, reference.runs),
    ));

    let tol_percent = tolerance * 100.0;
    let counters = [
        ("Events", test.events, reference.events),
        ("Tracks", test.tracks, reference.tracks),
        ("Steps", test.steps, reference.steps),
    ];
    for (label, test_count, reference_count) in counters {
        let diff = relative_difference_percent(test_count as f64, reference_count as f64);
        report.push(Check::new(
            label,
            diff.abs() <= tol_percent,
            format!("{test_count} {reference_count} Δ={diff:+.2}% tol={tol_percent:.1}%"),
        ));
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = "\
# NumberOfRun    = 1
# NumberOfEvents = 250000
# NumberOfTracks = 1606043
# NumberOfSteps  = 8549402
# PPS (Primary per sec)      = 10318.2
# TPS (Track per sec)        = 66287.4
# SPS (Step per sec)         = 352866.5
# StartDate                  = Tue Mar 25 14:03:01 2025
not a statistics line
";

    #[test]
    fn parses_counters_rates_and_text() {
        let stats = parse_stats(SAMPLE);
        assert_eq!(stats.runs, 1);
        assert_eq!(stats.events, 250_000);
        assert_eq!(stats.tracks, 1_606_043);
        assert_eq!(stats.steps, 8_549_402);
        assert_relative_eq!(stats.pps, 10_318.2);
        assert_relative_eq!(stats.tps, 66_287.4);
        assert_relative_eq!(stats.sps, 352_866.5);

        assert_eq!(stats.raw.len(), 8);
        assert_eq!(
            stats.raw.get("StartDate"),
            Some(&StatValue::Text("Tue Mar 25 14:03:01 2025".to_string()))
        );
    }

    #[test]
    fn unknown_entries_do_not_disturb_counters() {
        let stats = parse_stats("# ElapsedTime = 24.5\n# NumberOfEvents = 10\n");
        assert_eq!(stats.events, 10);
        assert_eq!(stats.runs, 0);
        assert_eq!(stats.raw.get("ElapsedTime"), Some(&StatValue::Float(24.5)));
    }

    #[test]
    fn zero_reference_reads_as_total_deviation() {
        assert_relative_eq!(relative_difference_percent(5.0, 0.0), 100.0);
        assert_relative_eq!(relative_difference_percent(0.0, 0.0), 100.0);
        assert_relative_eq!(relative_difference_percent(110.0, 100.0), 10.0);
        assert_relative_eq!(relative_difference_percent(90.0, 100.0), -10.0);
    }

    #[test]
    fn comparison_within_tolerance_passes() {
        let reference = SimStats {
            runs: 1,
            events: 1000,
            tracks: 5000,
            steps: 20_000,
            ..SimStats::default()
        };
        let mut test = reference.clone();
        test.events = 1099;
        test.tracks = 4901;

        let report = compare_stats(&test, &reference, 0.1);
        assert!(report.passed(), "9.9% deviation is inside a 10% tolerance");
    }

    #[test]
    fn comparison_beyond_tolerance_fails() {
        let reference = SimStats {
            runs: 1,
            events: 1000,
            tracks: 5000,
            steps: 20_000,
            ..SimStats::default()
        };
        let mut test = reference.clone();
        test.events = 1101;

        let report = compare_stats(&test, &reference, 0.1);
        assert!(!report.passed());
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.checks[1].label, "Events");
    }

    #[test]
    fn run_count_must_match_exactly() {
        let reference = SimStats {
            runs: 2,
            ..SimStats::default()
        };
        let test = SimStats {
            runs: 1,
            ..SimStats::default()
        };

        let report = compare_stats(&test, &reference, 0.1);
        assert!(!report.checks[0].passed);
    }

    #[test]
    fn read_rejects_missing_and_empty_files() {
        let err = read_stats_file("/nonexistent/stats.txt").unwrap_err();
        assert!(matches!(err, Error::MissingStatsFile(_)));

        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "nothing to see\n").unwrap();
        let err = read_stats_file(file.path()).unwrap_err();
        assert!(matches!(err, Error::MalformedStatsFile(_)));
    }

    #[test]
    fn read_parses_sample_file() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), SAMPLE).unwrap();
        let stats = read_stats_file(file.path()).unwrap();
        assert_eq!(stats.events, 250_000);
    }
}
