//! Executing one scenario against a world.
//!
//! Steps run strictly in order. The first step that fails, is undefined, is
//! ambiguous or is pending stops the scenario; every later step is recorded
//! as skipped. Nothing here touches other scenarios.

mod error;

use std::time::Instant;

use tracing::{debug, warn};

pub use error::ExecutionError;

use crate::feature::{Scenario, Step};
use crate::registry::StepRegistry;
use crate::reporting::{ScenarioStatus, SkippedScenario, StepRecord, StepStatus};
use crate::step::StepOutcome;

/// Run `scenario`'s steps against `world`.
///
/// Returns the step records in execution order and the scenario status. A
/// pending step yields [`ScenarioStatus::Skipped`]; `fail_on_skipped` marks
/// that skip as a forced failure.
pub async fn execute_scenario<W>(
    registry: &StepRegistry<W>,
    world: &mut W,
    feature_path: &str,
    scenario: &Scenario,
    fail_on_skipped: bool,
) -> (Vec<StepRecord>, ScenarioStatus)
where
    W: Send,
{
    let mut records = Vec::with_capacity(scenario.steps.len());
    let mut halted: Option<ScenarioStatus> = None;

    for step in &scenario.steps {
        if halted.is_some() {
            records.push(record(step, StepStatus::Skipped, Instant::now()));
            continue;
        }
        let started = Instant::now();
        let status = match execute_step(registry, world, feature_path, step).await {
            Ok(StepOutcome::Done) => {
                debug!(line = step.line, step = %step.text, "step passed");
                StepStatus::Passed
            }
            Ok(StepOutcome::Pending(reason)) => {
                debug!(line = step.line, step = %step.text, "step pending");
                halted = Some(ScenarioStatus::Skipped(SkippedScenario::new(
                    Some(
                        reason
                            .clone()
                            .unwrap_or_else(|| format!("pending step: {} {}", step.keyword, step.text)),
                    ),
                    fail_on_skipped,
                )));
                StepStatus::Pending(reason)
            }
            Err(err) => {
                warn!(scenario = %scenario.display_name(), "{err}");
                let undefined = err.is_undefined();
                halted = Some(ScenarioStatus::Failed(err.to_string()));
                if undefined {
                    StepStatus::Undefined
                } else {
                    StepStatus::Failed(err.to_string())
                }
            }
        };
        records.push(record(step, status, started));
    }

    (records, halted.unwrap_or(ScenarioStatus::Passed))
}

async fn execute_step<W>(
    registry: &StepRegistry<W>,
    world: &mut W,
    feature_path: &str,
    step: &Step,
) -> Result<StepOutcome, ExecutionError>
where
    W: Send,
{
    let resolved = registry
        .resolve_step(step)
        .map_err(|source| ExecutionError::Unbound {
            feature_path: feature_path.to_string(),
            line: step.line,
            source,
        })?;
    resolved
        .definition
        .call(world, &resolved.args)
        .await
        .map_err(|source| ExecutionError::HandlerFailed {
            feature_path: feature_path.to_string(),
            line: step.line,
            keyword: step.keyword,
            text: step.text.clone(),
            source,
        })
}

fn record(step: &Step, status: StepStatus, started: Instant) -> StepRecord {
    StepRecord {
        keyword: step.keyword,
        text: step.text.clone(),
        line: step.line,
        status,
        duration: started.elapsed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::parse_feature;
    use crate::step::{StepArgs, StepError, StepFuture};
    use rstest::{fixture, rstest};
    use std::path::Path;

    #[derive(Default)]
    struct Page {
        visited: Vec<String>,
    }

    fn visit<'a>(world: &'a mut Page, args: &'a StepArgs) -> StepFuture<'a> {
        Box::pin(async move {
            world.visited.push(args.require("page")?.to_string());
            Ok(StepOutcome::Done)
        })
    }

    fn expect_text<'a>(world: &'a mut Page, args: &'a StepArgs) -> StepFuture<'a> {
        Box::pin(async move {
            let text = args.require("text")?;
            if world.visited.iter().any(|page| page == text) {
                Ok(StepOutcome::Done)
            } else {
                Err(StepError::assertion(format!("text '{text}' not found")))
            }
        })
    }

    fn logged_in<'a>(_world: &'a mut Page, _args: &'a StepArgs) -> StepFuture<'a> {
        Box::pin(async { Ok(StepOutcome::pending("login flow")) })
    }

    #[fixture]
    fn registry() -> StepRegistry<Page> {
        let mut registry = StepRegistry::new();
        let outcomes = [
            registry.given("I am on the {page} page", visit),
            registry.given("I am logged in", logged_in),
            registry.then(r#"I see the text "{text}""#, expect_text),
        ];
        for outcome in outcomes {
            outcome.unwrap_or_else(|err| panic!("register: {err}"));
        }
        registry
    }

    fn scenario(steps: &str) -> Scenario {
        let text = format!("Feature: Site\n  Scenario: Under test\n{steps}");
        parse_feature(Path::new("site.feature"), text)
            .unwrap_or_else(|err| panic!("parse: {err}"))
            .scenarios
            .into_iter()
            .next()
            .unwrap_or_else(|| panic!("scenario missing"))
    }

    fn statuses(records: &[StepRecord]) -> Vec<&'static str> {
        records.iter().map(|r| r.status.label()).collect()
    }

    #[rstest]
    #[tokio::test]
    async fn passes_when_every_step_passes(registry: StepRegistry<Page>) {
        let scenario = scenario(
            "    Given I am on the about page\n    Then I see the text \"about\"\n",
        );
        let mut world = Page::default();
        let (records, status) =
            execute_scenario(&registry, &mut world, "site.feature", &scenario, false).await;
        assert_eq!(status, ScenarioStatus::Passed);
        assert_eq!(statuses(&records), vec!["passed", "passed"]);
        assert_eq!(world.visited, vec!["about".to_string()]);
    }

    #[rstest]
    #[tokio::test]
    async fn failure_skips_remaining_steps(registry: StepRegistry<Page>) {
        let scenario = scenario(
            "    Given I am on the landing page\n    Then I see the text \"About Us\"\n    \
             And I am on the about page\n",
        );
        let mut world = Page::default();
        let (records, status) =
            execute_scenario(&registry, &mut world, "site.feature", &scenario, false).await;
        assert_eq!(statuses(&records), vec!["passed", "failed", "skipped"]);
        let ScenarioStatus::Failed(message) = status else {
            panic!("scenario should fail");
        };
        assert!(message.contains("site.feature:4"), "{message}");
        assert!(message.contains("text 'About Us' not found"), "{message}");
        assert_eq!(world.visited, vec!["landing".to_string()]);
    }

    #[rstest]
    #[tokio::test]
    async fn undefined_step_fails_the_scenario(registry: StepRegistry<Page>) {
        let scenario = scenario("    Given I see the navigation bar\n    Then I see the text \"x\"\n");
        let mut world = Page::default();
        let (records, status) =
            execute_scenario(&registry, &mut world, "site.feature", &scenario, false).await;
        assert_eq!(statuses(&records), vec!["undefined", "skipped"]);
        assert!(matches!(status, ScenarioStatus::Failed(_)));
    }

    #[rstest]
    #[case(false)]
    #[case(true)]
    #[tokio::test]
    async fn pending_step_skips_the_scenario(
        registry: StepRegistry<Page>,
        #[case] fail_on_skipped: bool,
    ) {
        let scenario = scenario("    Given I am logged in\n    Then I see the text \"x\"\n");
        let mut world = Page::default();
        let (records, status) = execute_scenario(
            &registry,
            &mut world,
            "site.feature",
            &scenario,
            fail_on_skipped,
        )
        .await;
        assert_eq!(statuses(&records), vec!["pending", "skipped"]);
        assert_eq!(
            status,
            ScenarioStatus::Skipped(SkippedScenario::new(
                Some("login flow".into()),
                fail_on_skipped
            ))
        );
    }
}
