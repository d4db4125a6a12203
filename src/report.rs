//! Run accounting: verification checks and per-target step counts

use std::fmt;

/// What happened to a single step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The step did work this run
    Executed,
    /// The cache said done and the real condition still holds
    Cached,
}

/// Verification check counters for a whole run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Checks {
    pub passed: u32,
    pub failed: u32,
}

impl Checks {
    pub fn pass(&mut self) {
        self.passed += 1;
    }

    pub fn fail(&mut self) {
        self.failed += 1;
    }

    pub fn total(&self) -> u32 {
        self.passed + self.failed
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

impl fmt::Display for Checks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} check(s) performed: {} passed, {} failed",
            self.total(),
            self.passed,
            self.failed
        )
    }
}

/// Summary of one target's setup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetReport {
    pub name: String,
    pub executed: usize,
    pub cached: usize,
}

impl TargetReport {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            executed: 0,
            cached: 0,
        }
    }

    pub fn record(&mut self, outcome: StepOutcome) {
        match outcome {
            StepOutcome::Executed => self.executed += 1,
            StepOutcome::Cached => self.cached += 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checks_summary() {
        let mut checks = Checks::default();
        checks.pass();
        checks.pass();
        checks.fail();
        assert_eq!(checks.total(), 3);
        assert!(!checks.all_passed());
        assert_eq!(
            checks.to_string(),
            "3 check(s) performed: 2 passed, 1 failed"
        );
    }

    #[test]
    fn target_report_counts_outcomes() {
        let mut report = TargetReport::new("frontend");
        report.record(StepOutcome::Executed);
        report.record(StepOutcome::Cached);
        report.record(StepOutcome::Cached);
        assert_eq!(report.executed, 1);
        assert_eq!(report.cached, 2);
    }
}
