//! Run reports and their renderers.
//!
//! A [`RunReport`] holds one [`ScenarioRecord`] per executed scenario in
//! declaration order. The submodules render it as plain text, JSON or a
//! `JUnit` XML document.

pub mod json;
pub mod junit;
mod record;
pub mod text;

use std::time::Duration;

pub use record::{
    ScenarioRecord, ScenarioRecordBuilder, ScenarioStatus, SkippedScenario, StepRecord,
    StepStatus,
};

/// Scenario counts for a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    /// Scenarios executed.
    pub total: usize,
    /// Scenarios whose steps all passed.
    pub passed: usize,
    /// Scenarios that failed.
    pub failed: usize,
    /// Scenarios skipped by a pending step.
    pub skipped: usize,
}

/// Outcome of a whole run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunReport {
    records: Vec<ScenarioRecord>,
    duration: Duration,
}

impl RunReport {
    /// Build a report from records already in declaration order.
    #[must_use]
    pub fn new(records: Vec<ScenarioRecord>, duration: Duration) -> Self {
        Self { records, duration }
    }

    /// Scenario records in declaration order.
    #[must_use]
    pub fn records(&self) -> &[ScenarioRecord] {
        &self.records
    }

    /// Wall-clock duration of the run.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Count scenarios per status.
    #[must_use]
    pub fn summary(&self) -> Summary {
        self.records
            .iter()
            .fold(Summary::default(), |mut summary, record| {
                summary.total += 1;
                match record.status() {
                    ScenarioStatus::Passed => summary.passed += 1,
                    ScenarioStatus::Failed(_) => summary.failed += 1,
                    ScenarioStatus::Skipped(_) => summary.skipped += 1,
                }
                summary
            })
    }

    /// Whether no record counts as a failure.
    #[must_use]
    pub fn is_success(&self) -> bool {
        !self.records.iter().any(ScenarioRecord::is_failure)
    }
}
