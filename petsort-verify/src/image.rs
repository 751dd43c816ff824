//! Voxel image comparison.
//!
//! Compares a test image against a reference in two stages: geometry
//! (shape, spacing, origin, direction) and content. Content checks are
//! ratio based so that runs with different primary counts remain
//! comparable:
//! - total activity must agree within a relative tolerance, measured
//!   against the test image's sum
//! - the sum of absolute voxel differences (SAD) of the normalized
//!   images must stay below a tolerance, in percent
//!
//! Voxels carrying a designated ignore value (air, padding) can be
//! masked out of the content checks.
#![allow(clippy::float_cmp)]

use ndarray::ArrayD;

use crate::report::{Check, Report};

const RTOL: f64 = 1e-5;
const ATOL: f64 = 1e-8;

/// Spatial metadata of a voxel image.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImageInfo {
    /// Voxel spacing per axis (mm).
    pub spacing: Vec<f64>,
    /// Physical position of the first voxel (mm).
    pub origin: Vec<f64>,
    /// Row-major direction cosine matrix.
    pub direction: Vec<f64>,
}

/// A voxel image with spatial metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    /// Spatial metadata.
    pub info: ImageInfo,
    /// Voxel values, any dimensionality.
    pub data: ArrayD<f64>,
}

impl Image {
    /// Creates an image from metadata and voxel data.
    #[must_use]
    pub fn new(info: ImageInfo, data: ArrayD<f64>) -> Self {
        Self { info, data }
    }

    /// Sum over all voxels.
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.data.sum()
    }
}

/// Options for image content comparison.
#[derive(Debug, Clone)]
pub struct ImageCompareOptions {
    /// SAD tolerance, in percent.
    pub tolerance: f64,
    /// Activity sum tolerance, in percent.
    pub sum_tolerance: f64,
    /// Reference voxel value to exclude from the comparison.
    pub ignore_value_ref: Option<f64>,
    /// Test voxel value to exclude from the comparison.
    pub ignore_value_test: Option<f64>,
    /// Apply the ignore mask to the activity sum check as well.
    pub apply_ignore_mask_to_sum_check: bool,
    /// Run the SAD check.
    pub check_sad: bool,
}

impl Default for ImageCompareOptions {
    fn default() -> Self {
        Self {
            tolerance: 10.0,
            sum_tolerance: 5.0,
            ignore_value_ref: None,
            ignore_value_test: None,
            apply_ignore_mask_to_sum_check: true,
            check_sad: true,
        }
    }
}

impl ImageCompareOptions {
    /// Sets the SAD tolerance in percent.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the activity sum tolerance in percent.
    #[must_use]
    pub fn with_sum_tolerance(mut self, sum_tolerance: f64) -> Self {
        self.sum_tolerance = sum_tolerance;
        self
    }

    /// Masks out reference voxels equal to `value`.
    #[must_use]
    pub fn with_ignore_value_ref(mut self, value: f64) -> Self {
        self.ignore_value_ref = Some(value);
        self
    }

    /// Masks out test voxels equal to `value`.
    #[must_use]
    pub fn with_ignore_value_test(mut self, value: f64) -> Self {
        self.ignore_value_test = Some(value);
        self
    }

    /// Chooses whether the activity sum check sees masked or raw data.
    #[must_use]
    pub fn with_apply_ignore_mask_to_sum_check(mut self, apply: bool) -> Self {
        self.apply_ignore_mask_to_sum_check = apply;
        self
    }

    /// Enables or disables the SAD check.
    #[must_use]
    pub fn with_check_sad(mut self, check_sad: bool) -> Self {
        self.check_sad = check_sad;
        self
    }
}

/// Compares image geometry: shape, spacing, origin, and direction.
#[must_use]
pub fn compare_geometry(test: &Image, reference: &Image) -> Report {
    let mut report = Report::new();
    report.push(Check::new(
        "Image size",
        test.data.shape() == reference.data.shape(),
        format!("{:?} vs {:?}", test.data.shape(), reference.data.shape()),
    ));
    report.push(Check::new(
        "Voxel spacing",
        allclose(&test.info.spacing, &reference.info.spacing),
        format!("{:?} vs {:?}", test.info.spacing, reference.info.spacing),
    ));
    report.push(Check::new(
        "Origin",
        allclose(&test.info.origin, &reference.info.origin),
        format!("{:?} vs {:?}", test.info.origin, reference.info.origin),
    ));
    report.push(Check::new(
        "Direction",
        test.info.direction == reference.info.direction,
        format!("{:?} vs {:?}", test.info.direction, reference.info.direction),
    ));
    report
}

/// Compares image content against a reference.
///
/// Both relative measures use the test image as denominator: the activity
/// sum difference is `|ref - test| / test`, and the SAD normalization
/// divides both images by the masked test sum.
#[must_use]
pub fn compare_images(test: &Image, reference: &Image, options: &ImageCompareOptions) -> Report {
    let mut report = Report::new();

    if test.data.shape() != reference.data.shape() {
        report.push(Check::new(
            "Image content",
            false,
            format!(
                "shape {:?} vs {:?}, content not comparable",
                test.data.shape(),
                reference.data.shape()
            ),
        ));
        return report;
    }

    let keep = ignore_mask(&reference.data, &test.data, options);
    let total = keep.len();

    let (ref_sum, test_sum) = if options.apply_ignore_mask_to_sum_check {
        masked_sums(&reference.data, &test.data, &keep)
    } else {
        (reference.data.sum(), test.data.sum())
    };

    if test_sum == 0.0 {
        report.push(Check::new(
            "Activity sum",
            false,
            format!("reference {ref_sum} vs test 0, no activity in test image"),
        ));
    } else {
        let diff = (ref_sum - test_sum).abs() / test_sum * 100.0;
        report.push(Check::new(
            "Activity sum",
            diff < options.sum_tolerance,
            format!(
                "reference {ref_sum:.6} test {test_sum:.6} Δ={diff:.2}% tol={:.1}%",
                options.sum_tolerance
            ),
        ));
    }

    if options.check_sad {
        report.push(sad_check(&reference.data, &test.data, &keep, total, options));
    }

    report
}

fn sad_check(
    reference: &ArrayD<f64>,
    test: &ArrayD<f64>,
    keep: &[bool],
    total: usize,
    options: &ImageCompareOptions,
) -> Check {
    let mut norm = 0.0;
    for (&value, &kept) in test.iter().zip(keep) {
        if kept {
            norm += value;
        }
    }

    if norm == 0.0 {
        return Check::new(
            "Normalized SAD",
            false,
            "test image is empty after masking, cannot normalize".to_string(),
        );
    }

    let mut sad = 0.0;
    for ((&a, &b), &kept) in reference.iter().zip(test.iter()).zip(keep) {
        if kept {
            sad += (a - b).abs();
        }
    }
    let sad = sad / norm * 100.0;

    let considered = keep.iter().filter(|&&kept| kept).count();
    let nonzero = test.iter().filter(|&&value| value != 0.0).count();
    Check::new(
        "Normalized SAD",
        sad < options.tolerance,
        format!(
            "{sad:.2}% tol={:.1}%, computed on {considered}/{total} voxels ({nonzero} nonzero in test)",
            options.tolerance
        ),
    )
}

/// A voxel survives the mask when either side differs from its ignore
/// value; sides without an ignore value never veto.
fn ignore_mask(
    reference: &ArrayD<f64>,
    test: &ArrayD<f64>,
    options: &ImageCompareOptions,
) -> Vec<bool> {
    match (options.ignore_value_ref, options.ignore_value_test) {
        (None, None) => vec![true; reference.len()],
        (Some(a), None) => reference.iter().map(|&v| v != a).collect(),
        (None, Some(b)) => test.iter().map(|&v| v != b).collect(),
        (Some(a), Some(b)) => reference
            .iter()
            .zip(test.iter())
            .map(|(&x, &y)| x != a || y != b)
            .collect(),
    }
}

fn masked_sums(reference: &ArrayD<f64>, test: &ArrayD<f64>, keep: &[bool]) -> (f64, f64) {
    let mut ref_sum = 0.0;
    let mut test_sum = 0.0;
    for ((&a, &b), &kept) in reference.iter().zip(test.iter()).zip(keep) {
        if kept {
            ref_sum += a;
            test_sum += b;
        }
    }
    (ref_sum, test_sum)
}

fn allclose(a: &[f64], b: &[f64]) -> bool {
    a.len() == b.len()
        && a.iter()
            .zip(b)
            .all(|(&x, &y)| (x - y).abs() <= ATOL + RTOL * y.abs())
}
