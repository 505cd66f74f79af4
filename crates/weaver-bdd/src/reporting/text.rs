//! Human-readable report printed after a run.

use std::io::{self, Write};

use super::{RunReport, ScenarioStatus, StepStatus};

/// Write one block per scenario followed by a summary line.
///
/// Steps are listed only for scenarios that did not pass.
///
/// # Errors
/// Returns any error raised by the writer.
pub fn write<W: Write>(writer: &mut W, report: &RunReport) -> io::Result<()> {
    for record in report.records() {
        let marker = match record.status() {
            ScenarioStatus::Passed => "ok",
            ScenarioStatus::Failed(_) => "FAILED",
            ScenarioStatus::Skipped(_) => "skipped",
        };
        writeln!(
            writer,
            "{marker:>7}  {} ({}:{})",
            record.scenario_name(),
            record.feature_path(),
            record.line()
        )?;
        if matches!(record.status(), ScenarioStatus::Passed) {
            continue;
        }
        for step in record.steps() {
            write!(writer, "         {:<9} {} {}", step.status.label(), step.keyword, step.text)?;
            match &step.status {
                StepStatus::Failed(message) => writeln!(writer, "\n           {message}")?,
                StepStatus::Pending(Some(reason)) => writeln!(writer, " ({reason})")?,
                _ => writeln!(writer)?,
            }
        }
    }
    let summary = report.summary();
    writeln!(
        writer,
        "\n{} scenarios: {} passed, {} failed, {} skipped ({:.2}s)",
        summary.total,
        summary.passed,
        summary.failed,
        summary.skipped,
        report.duration().as_secs_f64()
    )
}
