//! `JUnit` XML writer for run reports.
//!
//! One `<testsuite>` per feature file inside a `<testsuites>` root. Failed
//! scenarios carry a `<failure>` with the step message; skipped scenarios
//! carry `<skipped>` plus a `<failure>` when the run fails on skips.

use std::fmt::{self, Write};

use super::{RunReport, ScenarioRecord, ScenarioStatus};

const FAIL_ON_SKIPPED_MESSAGE: &str = "Scenario skipped with fail-on-skipped enabled";

/// Render the report as a `JUnit` XML document.
///
/// # Errors
/// Returns an error if writing to the provided formatter fails.
pub fn write<W: Write>(writer: &mut W, report: &RunReport) -> fmt::Result {
    let records = report.records();
    let summary = report.summary();
    let failures = records.iter().filter(|record| record.is_failure()).count();

    writer.write_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n")?;
    writeln!(
        writer,
        "<testsuites name=\"note-weaver\" tests=\"{}\" failures=\"{failures}\" skipped=\"{}\" time=\"{:.3}\">",
        summary.total,
        summary.skipped,
        report.duration().as_secs_f64(),
    )?;
    for suite in group_by_feature(records) {
        write_suite(writer, &suite)?;
    }
    writer.write_str("</testsuites>\n")
}

fn group_by_feature(records: &[ScenarioRecord]) -> Vec<Vec<&ScenarioRecord>> {
    let mut suites: Vec<Vec<&ScenarioRecord>> = Vec::new();
    for record in records {
        if let Some(suite) = suites
            .iter_mut()
            .find(|suite| suite.first().is_some_and(|r| r.feature_path() == record.feature_path()))
        {
            suite.push(record);
            continue;
        }
        suites.push(vec![record]);
    }
    suites
}

fn write_suite<W: Write>(writer: &mut W, suite: &[&ScenarioRecord]) -> fmt::Result {
    let Some(first) = suite.first() else {
        return Ok(());
    };
    let failures = suite.iter().filter(|record| record.is_failure()).count();
    let skipped = suite
        .iter()
        .filter(|record| matches!(record.status(), ScenarioStatus::Skipped(_)))
        .count();

    writer.write_str("  <testsuite name=\"")?;
    write_escaped(writer, first.feature_name())?;
    writeln!(
        writer,
        "\" tests=\"{}\" failures=\"{failures}\" skipped=\"{skipped}\">",
        suite.len()
    )?;
    for record in suite {
        write_case(writer, record)?;
    }
    writer.write_str("  </testsuite>\n")
}

fn write_case<W: Write>(writer: &mut W, record: &ScenarioRecord) -> fmt::Result {
    writer.write_str("    <testcase name=\"")?;
    write_escaped(writer, record.scenario_name())?;
    writer.write_str("\" classname=\"")?;
    write_escaped(writer, record.feature_path())?;
    write!(writer, "\" time=\"{:.3}\"", record.duration().as_secs_f64())?;
    match record.status() {
        ScenarioStatus::Passed => writer.write_str(" />\n"),
        ScenarioStatus::Failed(message) => {
            writer.write_str(">\n      <failure message=\"")?;
            write_escaped(writer, message)?;
            writer.write_str("\" />\n    </testcase>\n")
        }
        ScenarioStatus::Skipped(details) => {
            writer.write_str(">\n      <skipped")?;
            if let Some(message) = details.message() {
                writer.write_str(" message=\"")?;
                write_escaped(writer, message)?;
                writer.write_char('"')?;
            }
            writer.write_str(" />\n")?;
            if details.forced_failure() {
                writer.write_str("      <failure type=\"fail_on_skipped\">")?;
                writer.write_str(FAIL_ON_SKIPPED_MESSAGE)?;
                writer.write_str("</failure>\n")?;
            }
            writer.write_str("    </testcase>\n")
        }
    }
}

fn write_escaped<W: Write>(writer: &mut W, value: &str) -> fmt::Result {
    for character in value.chars() {
        match character {
            '&' => writer.write_str("&amp;")?,
            '<' => writer.write_str("&lt;")?,
            '>' => writer.write_str("&gt;")?,
            '"' => writer.write_str("&quot;")?,
            '\'' => writer.write_str("&apos;")?,
            other if is_valid_xml_character(other) => writer.write_char(other)?,
            _ => writer.write_str("&#xFFFD;")?,
        }
    }
    Ok(())
}

fn is_valid_xml_character(character: char) -> bool {
    matches!(
        u32::from(character),
        0x09 | 0x0A | 0x0D | 0x20..=0xD7FF | 0xE000..=0xFFFD | 0x1_0000..=0x10_FFFF
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporting::fixtures::mixed_report;
    use rstest::rstest;

    fn render(forced: bool) -> String {
        let mut out = String::new();
        write(&mut out, &mixed_report(forced)).unwrap_or_else(|err| panic!("write: {err}"));
        out
    }

    #[test]
    fn groups_scenarios_by_feature() {
        let xml = render(false);
        assert!(xml.contains("tests=\"3\" failures=\"1\" skipped=\"1\""));
        assert!(xml.contains("<testsuite name=\"Front page\" tests=\"2\" failures=\"1\" skipped=\"0\">"));
        assert!(xml.contains("<testsuite name=\"Account\" tests=\"1\" failures=\"0\" skipped=\"1\">"));
        assert!(xml.contains("<skipped message=\"login flow\" />"));
        assert!(!xml.contains("fail_on_skipped"));
    }

    #[test]
    fn escapes_failure_messages() {
        assert!(render(false).contains(
            "<failure message=\"image &lt;company logo&gt; returned 404 &amp; no body\" />"
        ));
    }

    #[test]
    fn forced_skips_count_as_failures() {
        let xml = render(true);
        assert!(xml.contains("failures=\"2\""));
        assert!(xml.contains("<failure type=\"fail_on_skipped\">"));
    }

    #[rstest]
    #[case('\u{1}', false)]
    #[case('\t', true)]
    #[case('é', true)]
    #[case('\u{FFFE}', false)]
    fn classifies_xml_characters(#[case] ch: char, #[case] valid: bool) {
        assert_eq!(is_valid_xml_character(ch), valid);
    }
}
