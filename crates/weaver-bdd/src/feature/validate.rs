//! Well-formedness checks for loaded features.

use std::fmt;
use std::path::PathBuf;

use super::Feature;

/// A structural problem in a feature file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureIssue {
    /// The feature declares no scenarios.
    NoScenarios {
        /// Feature file.
        path: PathBuf,
    },
    /// A scenario has an empty title.
    UntitledScenario {
        /// Feature file.
        path: PathBuf,
        /// Line of the scenario header.
        line: usize,
    },
    /// A scenario has no steps of its own.
    EmptyScenario {
        /// Feature file.
        path: PathBuf,
        /// Line of the scenario header.
        line: usize,
        /// Scenario title.
        name: String,
    },
}

impl fmt::Display for FeatureIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoScenarios { path } => {
                write!(f, "{}: feature has no scenarios", path.display())
            }
            Self::UntitledScenario { path, line } => {
                write!(f, "{}:{line}: scenario has no title", path.display())
            }
            Self::EmptyScenario { path, line, name } => {
                write!(f, "{}:{line}: scenario '{name}' has no steps", path.display())
            }
        }
    }
}

/// Check that every scenario has a title and at least one step.
///
/// Outline rows are checked once per outline.
#[must_use]
pub fn validate_feature(feature: &Feature) -> Vec<FeatureIssue> {
    if feature.scenarios.is_empty() {
        return vec![FeatureIssue::NoScenarios {
            path: feature.path.clone(),
        }];
    }
    let mut issues = Vec::new();
    let mut seen_lines = Vec::new();
    for scenario in &feature.scenarios {
        if seen_lines.contains(&scenario.line) {
            continue;
        }
        seen_lines.push(scenario.line);
        if scenario.name.is_empty() {
            issues.push(FeatureIssue::UntitledScenario {
                path: feature.path.clone(),
                line: scenario.line,
            });
        }
        if scenario.own_steps().is_empty() {
            issues.push(FeatureIssue::EmptyScenario {
                path: feature.path.clone(),
                line: scenario.line,
                name: scenario.name.clone(),
            });
        }
    }
    issues
}
