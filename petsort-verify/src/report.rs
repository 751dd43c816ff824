//! Pass/fail reporting for verification checks.

/// Outcome of one verification check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Check {
    /// Short label naming the quantity checked.
    pub label: String,
    /// Whether the check passed.
    pub passed: bool,
    /// Human-readable values and tolerances behind the verdict.
    pub detail: String,
}

impl Check {
    /// Creates a check result.
    #[must_use]
    pub fn new(label: &str, passed: bool, detail: String) -> Self {
        Self {
            label: label.to_string(),
            passed,
            detail,
        }
    }
}

/// An ordered collection of check results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    /// Checks in evaluation order.
    pub checks: Vec<Check>,
}

impl Report {
    /// Creates an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one check.
    pub fn push(&mut self, check: Check) {
        self.checks.push(check);
    }

    /// Appends all checks from another report.
    pub fn merge(&mut self, other: Report) {
        self.checks.extend(other.checks);
    }

    /// True when every check passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|check| check.passed)
    }

    /// Number of failed checks.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.checks.iter().filter(|check| !check.passed).count()
    }
}
