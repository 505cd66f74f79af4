//! Loading feature files into runnable scenarios.
//!
//! Parsing is delegated to the `gherkin` crate. The parsed tree is flattened
//! into [`Feature`] values: backgrounds are prepended to each scenario, rules
//! are folded into the feature and outlines are expanded into one scenario
//! per examples row.

mod discovery;
mod outline;
mod validate;

use std::path::{Path, PathBuf};

use gherkin::GherkinEnv;
use thiserror::Error;
use weaver_patterns::StepKeyword;

pub use discovery::collect_feature_files;
pub use validate::{FeatureIssue, validate_feature};

/// Errors raised while loading feature files.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FeatureError {
    /// The file or directory could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Offending path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The text is not valid Gherkin.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// Offending path.
        path: PathBuf,
        /// Underlying parser error.
        #[source]
        source: gherkin::ParseError,
    },
    /// An outline references a column that its examples table lacks.
    #[error("{path}:{line}: scenario outline '{scenario}' uses unknown column <{column}>")]
    Outline {
        /// Offending path.
        path: PathBuf,
        /// Line of the outline.
        line: usize,
        /// Outline name.
        scenario: String,
        /// Placeholder without a matching column.
        column: String,
    },
    /// A requested path does not exist.
    #[error("feature path not found: {0}")]
    NotFound(PathBuf),
}

/// A parsed feature file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    /// File the feature was read from.
    pub path: PathBuf,
    /// Text after `Feature:`.
    pub name: String,
    /// Tags on the feature, each with a leading `@`.
    pub tags: Vec<String>,
    /// Runnable scenarios in declaration order.
    pub scenarios: Vec<Scenario>,
}

/// One runnable scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scenario {
    /// Title after `Scenario:`; empty when the author left it out.
    pub name: String,
    /// One-based line of the scenario header.
    pub line: usize,
    /// Feature, rule, scenario and examples tags, each with a leading `@`.
    pub tags: Vec<String>,
    /// Background steps followed by the scenario's own steps.
    pub steps: Vec<Step>,
    /// Number of leading steps inherited from backgrounds.
    pub background_len: usize,
    /// One-based examples row when expanded from an outline.
    pub example: Option<usize>,
}

impl Scenario {
    /// Name shown in reports, including the examples row for outlines.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.example.map_or_else(
            || self.name.clone(),
            |row| format!("{} (example {row})", self.name),
        )
    }

    /// Steps written under the scenario header itself.
    #[must_use]
    pub fn own_steps(&self) -> &[Step] {
        self.steps.get(self.background_len..).unwrap_or_default()
    }
}

/// One scenario step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Keyword as written.
    pub keyword: StepKeyword,
    /// Keyword with `And`/`But` resolved against the preceding step.
    pub resolved: StepKeyword,
    /// Text after the keyword.
    pub text: String,
    /// One-based line number.
    pub line: usize,
    /// Attached doc string, if any.
    pub docstring: Option<String>,
    /// Attached data table rows, if any.
    pub table: Option<Vec<Vec<String>>>,
}

/// Read and flatten a feature file.
///
/// # Errors
/// Returns [`FeatureError`] when the file cannot be read, is not valid
/// Gherkin or contains a malformed outline.
pub fn load_feature(path: &Path) -> Result<Feature, FeatureError> {
    let text = std::fs::read_to_string(path).map_err(|source| FeatureError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_feature(path, text)
}

/// Parse feature text that was obtained elsewhere. `path` is only used for
/// reporting.
///
/// # Errors
/// Returns [`FeatureError`] when the text is not valid Gherkin or contains a
/// malformed outline.
pub fn parse_feature(path: &Path, mut text: String) -> Result<Feature, FeatureError> {
    // gherkin rejects a final step without a trailing newline.
    if !text.ends_with('\n') {
        text.push('\n');
    }
    let parsed =
        gherkin::Feature::parse(&text, GherkinEnv::default()).map_err(|source| {
            FeatureError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })?;
    flatten(path, &parsed)
}

/// Load every feature under `paths`.
///
/// # Errors
/// Fails on the first path that cannot be discovered or loaded.
pub fn load_features(paths: &[PathBuf]) -> Result<Vec<Feature>, FeatureError> {
    collect_feature_files(paths)?
        .iter()
        .map(|path| load_feature(path))
        .collect()
}

fn flatten(path: &Path, parsed: &gherkin::Feature) -> Result<Feature, FeatureError> {
    let feature_tags = normalise_tags(&parsed.tags);
    let background = parsed
        .background
        .as_ref()
        .map(|bg| bg.steps.as_slice())
        .unwrap_or_default();

    let mut scenarios = Vec::new();
    let top = ScenarioContext {
        path,
        background: &[background],
        tags: &feature_tags,
    };
    for scenario in &parsed.scenarios {
        scenarios.extend(top.expand(scenario)?);
    }
    for rule in &parsed.rules {
        let mut rule_tags = feature_tags.clone();
        merge_tags(&mut rule_tags, &normalise_tags(&rule.tags));
        let rule_background = rule
            .background
            .as_ref()
            .map(|bg| bg.steps.as_slice())
            .unwrap_or_default();
        let ctx = ScenarioContext {
            path,
            background: &[background, rule_background],
            tags: &rule_tags,
        };
        for scenario in &rule.scenarios {
            scenarios.extend(ctx.expand(scenario)?);
        }
    }

    Ok(Feature {
        path: path.to_path_buf(),
        name: parsed.name.trim().to_string(),
        tags: feature_tags,
        scenarios,
    })
}

struct ScenarioContext<'a> {
    path: &'a Path,
    background: &'a [&'a [gherkin::Step]],
    tags: &'a [String],
}

impl ScenarioContext<'_> {
    fn expand(&self, scenario: &gherkin::Scenario) -> Result<Vec<Scenario>, FeatureError> {
        let mut tags = self.tags.to_vec();
        merge_tags(&mut tags, &normalise_tags(&scenario.tags));
        let inherited: Vec<&gherkin::Step> =
            self.background.iter().flat_map(|steps| steps.iter()).collect();

        if scenario.examples.is_empty() {
            let own: Vec<&gherkin::Step> = scenario.steps.iter().collect();
            return Ok(vec![build_scenario(
                scenario,
                &inherited,
                &own,
                tags,
                None,
            )]);
        }
        outline::expand(self.path, scenario, &inherited, &tags)
    }
}

pub(crate) fn build_scenario(
    scenario: &gherkin::Scenario,
    background: &[&gherkin::Step],
    own: &[&gherkin::Step],
    tags: Vec<String>,
    example: Option<usize>,
) -> Scenario {
    Scenario {
        name: scenario.name.trim().to_string(),
        line: scenario.position.line,
        tags,
        steps: convert_steps(background.iter().chain(own).copied()),
        background_len: background.len(),
        example,
    }
}

fn convert_steps<'a>(steps: impl Iterator<Item = &'a gherkin::Step>) -> Vec<Step> {
    let mut prev = None;
    steps
        .map(|step| {
            let keyword = StepKeyword::from_gherkin(&step.keyword, step.ty);
            Step {
                keyword,
                resolved: keyword.resolve(&mut prev),
                text: step.value.trim().to_string(),
                line: step.position.line,
                docstring: step.docstring.clone(),
                table: step.table.as_ref().map(|table| table.rows.clone()),
            }
        })
        .collect()
}

fn normalise_tags(tags: &[String]) -> Vec<String> {
    tags.iter()
        .map(|tag| {
            let tag = tag.trim();
            if tag.starts_with('@') {
                tag.to_string()
            } else {
                format!("@{tag}")
            }
        })
        .collect()
}

pub(crate) fn merge_tags(into: &mut Vec<String>, extra: &[String]) {
    for tag in extra {
        if !into.contains(tag) {
            into.push(tag.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parse(text: &str) -> Feature {
        parse_feature(Path::new("test.feature"), text.to_string())
            .unwrap_or_else(|err| panic!("feature should parse: {err}"))
    }

    #[test]
    fn prepends_background_steps() {
        let feature = parse(
            "Feature: Site\n\
             \n  Background:\n    Given I am on the landing page\n\
             \n  Scenario: Logo\n    Then I see the image company logo\n",
        );
        let [scenario] = feature.scenarios.as_slice() else {
            panic!("expected one scenario");
        };
        assert_eq!(scenario.background_len, 1);
        assert_eq!(scenario.steps.len(), 2);
        assert_eq!(scenario.own_steps().len(), 1);
        assert_eq!(
            scenario.own_steps().first().map(|s| s.text.as_str()),
            Some("I see the image company logo")
        );
    }

    #[test]
    fn resolves_conjunctions() {
        let feature = parse(
            "Feature: Site\n  Scenario: Welcome\n    Given I am on the landing page\n    \
             Then I see the company name\n    And I see the navigation bar\n    \
             But I see the text \"Welcome\"\n",
        );
        let resolved: Vec<_> = feature
            .scenarios
            .iter()
            .flat_map(|s| s.steps.iter().map(|step| (step.keyword, step.resolved)))
            .collect();
        assert_eq!(
            resolved,
            vec![
                (StepKeyword::Given, StepKeyword::Given),
                (StepKeyword::Then, StepKeyword::Then),
                (StepKeyword::And, StepKeyword::Then),
                (StepKeyword::But, StepKeyword::Then),
            ]
        );
    }

    #[rstest]
    #[case("@front", "@front")]
    #[case("front", "@front")]
    #[case(" @front ", "@front")]
    fn tags_gain_a_leading_at(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalise_tags(&[raw.to_string()]), vec![expected.to_string()]);
    }

    #[test]
    fn scenario_tags_include_feature_tags() {
        let feature = parse(
            "@site\nFeature: Site\n  @smoke\n  Scenario: About\n    Given I am on the about page\n",
        );
        assert_eq!(
            feature.scenarios.first().map(|s| s.tags.clone()),
            Some(vec!["@site".to_string(), "@smoke".to_string()])
        );
    }

    #[test]
    fn accepts_text_without_trailing_newline() {
        let feature = parse("Feature: Site\n  Scenario: About\n    Given I am on the about page");
        assert_eq!(feature.scenarios.len(), 1);
    }

    #[test]
    fn reports_parse_errors_with_path() {
        let Err(err) = parse_feature(Path::new("broken.feature"), "not gherkin\n".into()) else {
            panic!("invalid text must not parse");
        };
        assert!(err.to_string().contains("broken.feature"));
    }

    #[test]
    fn records_header_lines() {
        let feature = parse("Feature: Site\n\n  Scenario: About\n    Given I am on the about page\n");
        let scenario = feature.scenarios.first();
        assert_eq!(scenario.map(|s| s.line), Some(3));
        assert_eq!(
            scenario.and_then(|s| s.steps.first()).map(|step| step.line),
            Some(4)
        );
    }
}
