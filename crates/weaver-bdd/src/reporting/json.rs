//! JSON writer for run reports.
//!
//! Status labels are lowercase and durations are whole milliseconds so the
//! shape stays stable for downstream tooling.

use std::io::Write;

use serde::Serialize;

use super::{RunReport, ScenarioRecord, ScenarioStatus, StepRecord, StepStatus, Summary};

#[derive(Serialize)]
struct JsonReport<'a> {
    summary: JsonSummary,
    duration_ms: u128,
    scenarios: Vec<JsonScenario<'a>>,
}

#[derive(Serialize)]
struct JsonSummary {
    total: usize,
    passed: usize,
    failed: usize,
    skipped: usize,
    success: bool,
}

#[derive(Serialize)]
struct JsonScenario<'a> {
    feature_path: &'a str,
    feature_name: &'a str,
    scenario_name: &'a str,
    status: &'static str,
    line: usize,
    tags: &'a [String],
    duration_ms: u128,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    skip: Option<JsonSkip<'a>>,
    steps: Vec<JsonStep<'a>>,
}

#[derive(Serialize)]
struct JsonSkip<'a> {
    message: Option<&'a str>,
    forced_failure: bool,
}

#[derive(Serialize)]
struct JsonStep<'a> {
    keyword: &'static str,
    text: &'a str,
    line: usize,
    status: &'static str,
    duration_ms: u128,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
}

impl<'a> From<&'a RunReport> for JsonReport<'a> {
    fn from(report: &'a RunReport) -> Self {
        let Summary {
            total,
            passed,
            failed,
            skipped,
        } = report.summary();
        Self {
            summary: JsonSummary {
                total,
                passed,
                failed,
                skipped,
                success: report.is_success(),
            },
            duration_ms: report.duration().as_millis(),
            scenarios: report.records().iter().map(JsonScenario::from).collect(),
        }
    }
}

impl<'a> From<&'a ScenarioRecord> for JsonScenario<'a> {
    fn from(record: &'a ScenarioRecord) -> Self {
        let (message, skip) = match record.status() {
            ScenarioStatus::Passed => (None, None),
            ScenarioStatus::Failed(message) => (Some(message.as_str()), None),
            ScenarioStatus::Skipped(details) => (
                None,
                Some(JsonSkip {
                    message: details.message(),
                    forced_failure: details.forced_failure(),
                }),
            ),
        };
        Self {
            feature_path: record.feature_path(),
            feature_name: record.feature_name(),
            scenario_name: record.scenario_name(),
            status: record.status().label(),
            line: record.line(),
            tags: record.tags(),
            duration_ms: record.duration().as_millis(),
            message,
            skip,
            steps: record.steps().iter().map(JsonStep::from).collect(),
        }
    }
}

impl<'a> From<&'a StepRecord> for JsonStep<'a> {
    fn from(step: &'a StepRecord) -> Self {
        let message = match &step.status {
            StepStatus::Failed(message) => Some(message.as_str()),
            StepStatus::Pending(reason) => reason.as_deref(),
            StepStatus::Passed | StepStatus::Skipped | StepStatus::Undefined => None,
        };
        Self {
            keyword: step.keyword.as_str(),
            text: &step.text,
            line: step.line,
            status: step.status.label(),
            duration_ms: step.duration.as_millis(),
            message,
        }
    }
}

/// Write the report as pretty-printed JSON.
///
/// # Errors
/// Returns any error raised while serialising or writing.
pub fn write<W: Write>(writer: &mut W, report: &RunReport) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, &JsonReport::from(report))?;
    writeln!(writer).map_err(serde_json::Error::io)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporting::fixtures::mixed_report;

    #[test]
    fn serialises_statuses_and_steps() {
        let mut out = Vec::new();
        write(&mut out, &mixed_report(false)).unwrap_or_else(|err| panic!("write: {err}"));
        let value: serde_json::Value =
            serde_json::from_slice(&out).unwrap_or_else(|err| panic!("parse: {err}"));

        let pointer = |path: &str| value.pointer(path).cloned();
        assert_eq!(pointer("/summary/total"), Some(3.into()));
        assert_eq!(pointer("/summary/success"), Some(false.into()));
        assert_eq!(pointer("/scenarios/0/status"), Some("passed".into()));
        assert_eq!(pointer("/scenarios/0/message"), None);
        assert_eq!(pointer("/scenarios/1/status"), Some("failed".into()));
        assert_eq!(pointer("/scenarios/1/steps/1/status"), Some("failed".into()));
        assert_eq!(pointer("/scenarios/2/skip/message"), Some("login flow".into()));
        assert_eq!(pointer("/scenarios/2/skip/forced_failure"), Some(false.into()));
        assert_eq!(pointer("/scenarios/2/steps/1/status"), Some("skipped".into()));
    }
}
