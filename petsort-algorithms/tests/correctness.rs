#![allow(clippy::uninlined_format_args, clippy::cast_sign_loss)]
use petsort_algorithms::{
    sort_coincidences, sort_coincidences_with_progress, sort_prompt_and_delayed, SortConfig,
    SortProgress,
};
use petsort_core::{CoincidenceBatch, Error, Position, Single, SinglesBatch, VolumeId};

/// Builds a batch from (time ns, event id, volume) triples.
fn batch(records: &[(f64, i32, u32)]) -> SinglesBatch {
    let mut singles = SinglesBatch::with_capacity(records.len());
    for &(time_ns, event_id, volume) in records {
        singles.push(Single::new(
            time_ns,
            event_id,
            0.511,
            Position::new(f64::from(event_id), 0.0, 0.0),
            VolumeId::new(volume),
            1,
            0,
        ));
    }
    singles
}

fn sort(records: &[(f64, i32, u32)], window_ns: f64) -> CoincidenceBatch {
    let config = SortConfig::default().with_time_window_ns(window_ns);
    sort_coincidences(&batch(records), &config).unwrap()
}

fn pair_times(out: &CoincidenceBatch) -> Vec<(f64, f64)> {
    out.time1_ns
        .iter()
        .zip(&out.time2_ns)
        .map(|(&t1, &t2)| (t1, t2))
        .collect()
}

#[test]
fn two_isolated_pairs() {
    let out = sort(
        &[(0.0, 1, 0), (100.0, 1, 1), (1000.0, 2, 0), (1090.0, 2, 1)],
        120.0,
    );
    assert_eq!(
        pair_times(&out),
        vec![(0.0, 100.0), (1000.0, 1090.0)],
        "expected one pair per annihilation, got {:?}",
        pair_times(&out)
    );
    assert_eq!(out.event_id1, vec![1, 2]);
    assert_eq!(out.event_id2, vec![1, 2]);
}

#[test]
fn same_volume_within_window_is_not_a_pair() {
    // Both deposits land in the same crystal volume; the lone late single
    // in another volume is out of every window.
    let out = sort(&[(0.0, 1, 0), (50.0, 1, 0), (2000.0, 2, 1)], 120.0);
    assert!(out.is_empty(), "same-volume deposits must not pair");
}

#[test]
fn same_volume_record_is_scanned_past() {
    // The window opener at t=0 skips its same-volume neighbor at t=50 and
    // pairs with t=100; the neighbor then opens its own window and pairs
    // with t=100 as well.
    let out = sort(&[(0.0, 1, 0), (50.0, 1, 0), (100.0, 2, 1)], 120.0);
    assert_eq!(pair_times(&out), vec![(0.0, 100.0), (50.0, 100.0)]);
}

#[test]
fn window_edge_is_inclusive() {
    let hit = sort(&[(0.0, 1, 0), (120.0, 1, 1)], 120.0);
    assert_eq!(hit.len(), 1, "a pair exactly on the window edge counts");

    let miss = sort(&[(0.0, 1, 0), (120.1, 1, 1)], 120.0);
    assert!(miss.is_empty(), "just past the edge must not count");
}

#[test]
fn records_may_appear_in_multiple_pairs() {
    // Three volumes, 10 ns apart: the middle single partners both ways.
    let out = sort(&[(0.0, 1, 0), (10.0, 2, 1), (20.0, 3, 2)], 120.0);
    assert_eq!(pair_times(&out), vec![(0.0, 10.0), (10.0, 20.0)]);
}

#[test]
fn unsorted_input_is_ordered_internally() {
    let out = sort(
        &[(1000.0, 2, 0), (0.0, 1, 0), (1090.0, 2, 1), (100.0, 1, 1)],
        120.0,
    );
    assert_eq!(pair_times(&out), vec![(0.0, 100.0), (1000.0, 1090.0)]);
}

#[test]
fn tied_timestamps_keep_input_order() {
    // All three singles share a timestamp; the stable ordering keeps them
    // in input order, so the scan pairs (1,2) and then (2,3).
    let out = sort(&[(500.0, 1, 0), (500.0, 2, 1), (500.0, 3, 0)], 120.0);
    assert_eq!(out.event_id1, vec![1, 2]);
    assert_eq!(out.event_id2, vec![2, 3]);
}

#[test]
fn tiny_inputs_produce_empty_output() {
    assert!(sort(&[], 120.0).is_empty());
    assert!(sort(&[(0.0, 1, 0)], 120.0).is_empty());
}

#[test]
fn delayed_pass_emits_original_times() {
    let config = SortConfig::default().with_offset_ns(500.0);
    let out = sort_coincidences(&batch(&[(0.0, 1, 0), (100.0, 1, 1)]), &config).unwrap();
    assert_eq!(
        pair_times(&out),
        vec![(0.0, 100.0)],
        "the delay offset must never leak into output times"
    );
}

#[test]
fn delayed_pass_matches_prompt_pass_for_uniform_shift() {
    // Shifting every time by the same amount preserves the ordering and
    // all pairwise differences, so both passes find the same pairs.
    let records: Vec<(f64, i32, u32)> = (0..200)
        .map(|k| (f64::from(k) * 37.5, k, (k % 7) as u32))
        .collect();
    let both = sort_prompt_and_delayed(&batch(&records), 120.0, 500.0).unwrap();
    assert_eq!(both.prompt, both.delayed);
    assert!(!both.prompt.is_empty());
}

#[test]
fn negative_offset_is_allowed() {
    let config = SortConfig::default().with_offset_ns(-500.0);
    let out = sort_coincidences(&batch(&[(600.0, 1, 0), (700.0, 1, 1)]), &config).unwrap();
    assert_eq!(pair_times(&out), vec![(600.0, 700.0)]);
}

#[test]
fn invalid_configurations_are_rejected() {
    let singles = batch(&[(0.0, 1, 0), (100.0, 1, 1)]);

    let negative_window = SortConfig::default().with_time_window_ns(-1.0);
    assert!(matches!(
        sort_coincidences(&singles, &negative_window),
        Err(Error::InvalidTimeWindow(_))
    ));

    let nan_window = SortConfig::default().with_time_window_ns(f64::NAN);
    assert!(matches!(
        sort_coincidences(&singles, &nan_window),
        Err(Error::InvalidTimeWindow(_))
    ));

    let nan_offset = SortConfig::default().with_offset_ns(f64::NAN);
    assert!(matches!(
        sort_coincidences(&singles, &nan_offset),
        Err(Error::InvalidTimeOffset(_))
    ));
}

#[test]
fn non_finite_times_are_rejected() {
    let mut singles = batch(&[(0.0, 1, 0), (100.0, 1, 1)]);
    singles.time_ns[1] = f64::NAN;
    assert!(matches!(
        sort_coincidences(&singles, &SortConfig::default()),
        Err(Error::NonFiniteTime { index: 1 })
    ));
}

#[test]
fn pairs_copy_every_field_from_both_sides() {
    let mut singles = SinglesBatch::default();
    singles.push(Single::new(
        100.0,
        7,
        0.511,
        Position::new(1.5, -2.5, 3.5),
        VolumeId::new(0),
        11,
        3,
    ));
    singles.push(Single::new(
        150.0,
        8,
        0.475,
        Position::new(-4.5, 5.5, -6.5),
        VolumeId::new(1),
        22,
        4,
    ));

    let out = sort_coincidences(&singles, &SortConfig::default()).unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out.time1_ns, vec![100.0]);
    assert_eq!(out.time2_ns, vec![150.0]);
    assert_eq!(out.event_id1, vec![7]);
    assert_eq!(out.event_id2, vec![8]);
    assert_eq!(out.energy1, vec![0.511]);
    assert_eq!(out.energy2, vec![0.475]);
    assert_eq!(out.pos_x1, vec![1.5]);
    assert_eq!(out.pos_y1, vec![-2.5]);
    assert_eq!(out.pos_z1, vec![3.5]);
    assert_eq!(out.pos_x2, vec![-4.5]);
    assert_eq!(out.pos_y2, vec![5.5]);
    assert_eq!(out.pos_z2, vec![-6.5]);
    assert_eq!(out.volume1, vec![VolumeId::new(0)]);
    assert_eq!(out.volume2, vec![VolumeId::new(1)]);
    // The pair inherits the window opener's run id.
    assert_eq!(out.run_id, vec![3]);
    assert_eq!(out.track_id1, vec![11]);
    assert_eq!(out.track_id2, vec![22]);
    // Scatter history is untracked in singles-only pipelines.
    assert_eq!(out.compton_phantom1, vec![0]);
    assert_eq!(out.compton_phantom2, vec![0]);
    assert_eq!(out.rayleigh_phantom1, vec![0]);
    assert_eq!(out.rayleigh_phantom2, vec![0]);
    assert_eq!(out.source_id1, vec![0]);
    assert_eq!(out.source_id2, vec![0]);
}

#[test]
fn progress_reports_at_requested_interval() {
    let singles = batch(&[
        (0.0, 1, 0),
        (10.0, 2, 1),
        (20.0, 3, 0),
        (30.0, 4, 1),
        (40.0, 5, 0),
    ]);
    let mut seen: Vec<SortProgress> = Vec::new();
    let out =
        sort_coincidences_with_progress(&singles, &SortConfig::default(), 2, |p| seen.push(p))
            .unwrap();

    assert_eq!(out.len(), 4);
    assert_eq!(
        seen,
        vec![
            SortProgress {
                processed: 2,
                total: 4,
                found: 2,
            },
            SortProgress {
                processed: 4,
                total: 4,
                found: 4,
            },
        ]
    );
}
