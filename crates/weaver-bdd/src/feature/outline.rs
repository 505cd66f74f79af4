//! Scenario outline expansion.

use std::collections::HashMap;
use std::path::Path;

use super::{FeatureError, Scenario, build_scenario, merge_tags, normalise_tags};

/// Expand an outline into one scenario per examples row.
///
/// Rows are numbered from one across every examples block of the outline.
pub(super) fn expand(
    path: &Path,
    outline: &gherkin::Scenario,
    background: &[&gherkin::Step],
    tags: &[String],
) -> Result<Vec<Scenario>, FeatureError> {
    let mut expanded = Vec::new();
    let mut row_number = 0usize;
    for examples in &outline.examples {
        let Some(table) = examples.table.as_ref() else {
            continue;
        };
        let Some((header, rows)) = table.rows.split_first() else {
            continue;
        };
        let mut row_tags = tags.to_vec();
        merge_tags(&mut row_tags, &normalise_tags(&examples.tags));

        for row in rows {
            row_number += 1;
            let values: HashMap<&str, &str> = header
                .iter()
                .map(|name| name.trim())
                .zip(row.iter().map(String::as_str))
                .collect();
            let steps = outline
                .steps
                .iter()
                .map(|step| substitute_step(step, &values))
                .collect::<Result<Vec<_>, String>>()
                .map_err(|column| FeatureError::Outline {
                    path: path.to_path_buf(),
                    line: outline.position.line,
                    scenario: outline.name.trim().to_string(),
                    column,
                })?;
            let own: Vec<&gherkin::Step> = steps.iter().collect();
            expanded.push(build_scenario(
                outline,
                background,
                &own,
                row_tags.clone(),
                Some(row_number),
            ));
        }
    }
    Ok(expanded)
}

fn substitute_step(
    step: &gherkin::Step,
    values: &HashMap<&str, &str>,
) -> Result<gherkin::Step, String> {
    let mut step = step.clone();
    step.value = substitute(&step.value, values)?;
    if let Some(docstring) = step.docstring.as_mut() {
        *docstring = substitute(docstring, values)?;
    }
    if let Some(table) = step.table.as_mut() {
        for cell in table.rows.iter_mut().flatten() {
            *cell = substitute(cell, values)?;
        }
    }
    Ok(step)
}

/// Replace `<column>` references; the error carries the first unknown name.
fn substitute(text: &str, values: &HashMap<&str, &str>) -> Result<String, String> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(open) = rest.find('<') {
        let (before, tail) = rest.split_at(open);
        out.push_str(before);
        let candidate = tail.get(1..).unwrap_or_default();
        match candidate.find(['>', '<', '\n']) {
            Some(close) if candidate.get(close..close + 1) == Some(">") && close > 0 => {
                let name = candidate.get(..close).unwrap_or_default();
                let value = values.get(name).ok_or_else(|| name.to_string())?;
                out.push_str(value);
                rest = candidate.get(close + 1..).unwrap_or_default();
            }
            _ => {
                out.push('<');
                rest = candidate;
            }
        }
    }
    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::parse_feature;
    use rstest::rstest;

    const OUTLINE: &str = "\
Feature: Links
  Scenario Outline: Outbound link
    Given I am on the landing page
    Then I see a link to \"<url>\"

    @external
    Examples:
      | url                                       |
      | https://github.com/DataByne/uraPointOfSale |
      | https://www.kent.edu/cs                   |
";

    #[test]
    fn expands_each_row() {
        let feature = parse_feature(Path::new("links.feature"), OUTLINE.to_string())
            .unwrap_or_else(|err| panic!("outline should parse: {err}"));
        let names: Vec<_> = feature.scenarios.iter().map(Scenario::display_name).collect();
        assert_eq!(
            names,
            vec!["Outbound link (example 1)", "Outbound link (example 2)"]
        );
        let texts: Vec<_> = feature
            .scenarios
            .iter()
            .filter_map(|s| s.steps.last().map(|step| step.text.clone()))
            .collect();
        assert_eq!(
            texts,
            vec![
                "I see a link to \"https://github.com/DataByne/uraPointOfSale\"",
                "I see a link to \"https://www.kent.edu/cs\"",
            ]
        );
        assert!(
            feature
                .scenarios
                .iter()
                .all(|s| s.tags.contains(&"@external".to_string()))
        );
    }

    #[test]
    fn unknown_column_is_an_error() {
        let text = OUTLINE.replace("<url>", "<href>");
        let Err(err) = parse_feature(Path::new("links.feature"), text) else {
            panic!("unknown column must be rejected");
        };
        assert!(matches!(
            err,
            FeatureError::Outline { ref column, .. } if column == "href"
        ));
    }

    #[rstest]
    #[case("a <x> b", "a 1 b")]
    #[case("1 < 2", "1 < 2")]
    #[case("<>", "<>")]
    #[case("<x><x>", "11")]
    #[case("<<x>", "<1")]
    fn substitutes_known_columns(#[case] input: &str, #[case] expected: &str) {
        let values = HashMap::from([("x", "1")]);
        assert_eq!(substitute(input, &values).as_deref(), Ok(expected));
    }
}
