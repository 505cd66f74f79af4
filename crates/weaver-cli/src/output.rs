//! Rendering reports and step listings.

use std::io::Write;

use clap::ValueEnum;
use eyre::{Context, Result};
use weaver_bdd::StepDefinition;
use weaver_bdd::reporting::{RunReport, json, junit, text};

/// Format of the run report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// One line per scenario and failing step detail.
    Text,
    /// Machine-readable JSON.
    Json,
    /// `JUnit` XML for CI dashboards.
    Junit,
}

pub(crate) fn write_report(
    mut writer: &mut dyn Write,
    report: &RunReport,
    format: ReportFormat,
) -> Result<()> {
    match format {
        ReportFormat::Text => text::write(&mut writer, report).wrap_err("failed to write report"),
        ReportFormat::Json => {
            json::write(&mut writer, report).wrap_err("failed to write JSON report")
        }
        ReportFormat::Junit => {
            let mut xml = String::new();
            junit::write(&mut xml, report).wrap_err("failed to render JUnit report")?;
            writer
                .write_all(xml.as_bytes())
                .wrap_err("failed to write JUnit report")
        }
    }
}

pub(crate) fn write_definitions<W>(
    writer: &mut dyn Write,
    definitions: &[&StepDefinition<W>],
) -> Result<()> {
    for definition in definitions {
        writeln!(writer, "{definition}")
            .wrap_err_with(|| format!("failed to write step {definition}"))?;
    }
    Ok(())
}

pub(crate) fn write_group_separator(writer: &mut dyn Write) -> Result<()> {
    writeln!(writer, "---").wrap_err("failed to write duplicate separator")
}
