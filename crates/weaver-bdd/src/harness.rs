//! Running selected scenarios with bounded concurrency.
//!
//! Every scenario runs in its own tokio task with a world built fresh by the
//! runner's factory, so scenarios share no mutable state. A semaphore bounds
//! the number of scenarios in flight; with one job they run one after another
//! in declaration order. Records are always reported in declaration order.

use std::any::Any;
use std::fmt::Display;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::execution::{ExecutionError, execute_scenario};
use crate::feature::{Feature, Scenario};
use crate::registry::StepRegistry;
use crate::reporting::{RunReport, ScenarioRecord, ScenarioRecordBuilder, ScenarioStatus};
use crate::tags::TagExpression;

type WorldFactory<W> = dyn Fn() -> Result<W, String> + Send + Sync;

/// Options controlling which scenarios run and how.
#[derive(Clone, Debug)]
pub struct RunOptions {
    /// Maximum scenarios executing at once.
    pub jobs: NonZeroUsize,
    /// Only scenarios whose tags satisfy the expression run.
    pub tags: Option<TagExpression>,
    /// Treat scenarios skipped by pending steps as failures.
    pub fail_on_skipped: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            jobs: NonZeroUsize::MIN,
            tags: None,
            fail_on_skipped: false,
        }
    }
}

/// Executes features against a shared registry.
pub struct Runner<W> {
    registry: Arc<StepRegistry<W>>,
    factory: Arc<WorldFactory<W>>,
    options: RunOptions,
}

impl<W> std::fmt::Debug for Runner<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("registry", &self.registry)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<W> Runner<W>
where
    W: Send + 'static,
{
    /// Create a runner that builds one world per scenario with `factory`.
    pub fn new<F, E>(registry: StepRegistry<W>, factory: F) -> Self
    where
        F: Fn() -> Result<W, E> + Send + Sync + 'static,
        E: Display,
    {
        Self {
            registry: Arc::new(registry),
            factory: Arc::new(move || factory().map_err(|err| err.to_string())),
            options: RunOptions::default(),
        }
    }

    /// Replace the run options.
    #[must_use]
    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    /// Registry shared by every scenario.
    #[must_use]
    pub fn registry(&self) -> &StepRegistry<W> {
        &self.registry
    }

    /// Scenarios selected by the tag filter, in declaration order.
    #[must_use]
    pub fn select<'f>(&self, features: &'f [Feature]) -> Vec<(&'f Feature, &'f Scenario)> {
        features
            .iter()
            .flat_map(|feature| feature.scenarios.iter().map(move |s| (feature, s)))
            .filter(|(_, scenario)| {
                self.options.tags.as_ref().is_none_or(|expr| {
                    expr.matches(scenario.tags.iter().map(String::as_str))
                })
            })
            .collect()
    }

    /// Run every selected scenario and collect the report.
    pub async fn run(&self, features: &[Feature]) -> RunReport {
        let started = Instant::now();
        let selected = self.select(features);
        info!(
            scenarios = selected.len(),
            jobs = self.options.jobs.get(),
            "starting run"
        );

        let semaphore = Arc::new(Semaphore::new(self.options.jobs.get()));
        let mut pending: Vec<(ScenarioRecordBuilder, Option<JoinHandle<ScenarioRecord>>)> =
            Vec::with_capacity(selected.len());
        for (feature, scenario) in selected {
            let builder = ScenarioRecord::new(
                feature.path.display().to_string(),
                feature.name.clone(),
                scenario.display_name(),
                scenario.line,
                scenario.tags.clone(),
            );
            // Permits are taken in declaration order, so one job runs
            // scenarios sequentially.
            let handle = match Arc::clone(&semaphore).acquire_owned().await {
                Ok(permit) => {
                    let task = ScenarioTask {
                        registry: Arc::clone(&self.registry),
                        factory: Arc::clone(&self.factory),
                        builder: builder.clone(),
                        scenario: scenario.clone(),
                        fail_on_skipped: self.options.fail_on_skipped,
                    };
                    Some(tokio::spawn(async move {
                        let record = task.run().await;
                        drop(permit);
                        record
                    }))
                }
                Err(_) => None,
            };
            pending.push((builder, handle));
        }

        let mut records = Vec::with_capacity(pending.len());
        for (builder, handle) in pending {
            let Some(handle) = handle else {
                records.push(crashed(builder, "worker pool closed".to_string()));
                continue;
            };
            let record = match handle.await {
                Ok(record) => record,
                Err(err) if err.is_panic() => {
                    let payload = err.into_panic();
                    crashed(builder, panic_message(&*payload))
                }
                Err(_) => crashed(builder, "task cancelled".to_string()),
            };
            records.push(record);
        }

        let report = RunReport::new(records, started.elapsed());
        let summary = report.summary();
        info!(
            total = summary.total,
            passed = summary.passed,
            failed = summary.failed,
            skipped = summary.skipped,
            "run finished"
        );
        report
    }
}

struct ScenarioTask<W> {
    registry: Arc<StepRegistry<W>>,
    factory: Arc<WorldFactory<W>>,
    builder: ScenarioRecordBuilder,
    scenario: Scenario,
    fail_on_skipped: bool,
}

impl<W> ScenarioTask<W>
where
    W: Send + 'static,
{
    async fn run(self) -> ScenarioRecord {
        let started = Instant::now();
        let name = self.builder.scenario_name().to_string();
        let mut world = match (self.factory)() {
            Ok(world) => world,
            Err(message) => {
                let err = ExecutionError::WorldSetup {
                    scenario: name,
                    message,
                };
                warn!("{err}");
                return self.builder.finish(
                    Vec::new(),
                    ScenarioStatus::Failed(err.to_string()),
                    started.elapsed(),
                );
            }
        };
        let feature_path = self.builder.feature_path().to_string();
        let (steps, status) = execute_scenario(
            &self.registry,
            &mut world,
            &feature_path,
            &self.scenario,
            self.fail_on_skipped,
        )
        .await;
        info!(scenario = %name, status = status.label(), "scenario finished");
        self.builder.finish(steps, status, started.elapsed())
    }
}

fn crashed(builder: ScenarioRecordBuilder, message: String) -> ScenarioRecord {
    let err = ExecutionError::Panicked {
        scenario: builder.scenario_name().to_string(),
        message,
    };
    warn!("{err}");
    builder.finish(
        Vec::new(),
        ScenarioStatus::Failed(err.to_string()),
        std::time::Duration::ZERO,
    )
}

/// Extract a readable message from a panic payload.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| format!("{payload:?}"))
}
