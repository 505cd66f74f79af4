//! Gherkin scenario runner for the Note Weaver acceptance suite.
//!
//! The crate loads `.feature` files, binds their steps to handlers held in a
//! [`StepRegistry`], executes each scenario against a fresh world and
//! reports the outcome as text, JSON or `JUnit` XML.
//!
//! ```
//! use weaver_bdd::{StepArgs, StepFuture, StepOutcome, StepRegistry};
//!
//! #[derive(Default)]
//! struct World {
//!     page: Option<String>,
//! }
//!
//! fn visit<'a>(world: &'a mut World, args: &'a StepArgs) -> StepFuture<'a> {
//!     Box::pin(async move {
//!         world.page = Some(args.require("page")?.to_string());
//!         Ok(StepOutcome::Done)
//!     })
//! }
//!
//! let mut registry = StepRegistry::new();
//! registry.given("I am on the {page} page", visit).unwrap();
//! assert_eq!(registry.definitions().len(), 1);
//! ```

pub mod execution;
pub mod feature;
mod harness;
mod registry;
pub mod reporting;
mod step;
mod tags;

pub use execution::{ExecutionError, execute_scenario};
pub use feature::{
    Feature, FeatureError, FeatureIssue, Scenario, Step, collect_feature_files, load_feature,
    load_features, parse_feature, validate_feature,
};
pub use harness::{RunOptions, Runner};
pub use registry::{
    RegistryError, ResolveError, Resolved, StepDefinition, StepRegistry, UnboundStep,
};
pub use reporting::{
    RunReport, ScenarioRecord, ScenarioStatus, SkippedScenario, StepRecord, StepStatus, Summary,
};
pub use step::{StepArgs, StepError, StepFuture, StepHandler, StepOutcome, StepResult};
pub use tags::{TagExprError, TagExpression};
pub use weaver_patterns::StepKeyword;
