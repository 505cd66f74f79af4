//! Data structures describing scenario and step results.

use std::time::Duration;

use weaver_patterns::StepKeyword;

/// Result of a single step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepStatus {
    /// The handler completed.
    Passed,
    /// The handler failed or the step was ambiguous.
    Failed(String),
    /// Not executed because an earlier step stopped the scenario.
    Skipped,
    /// No definition matches the step.
    Undefined,
    /// The definition is not implemented yet.
    Pending(Option<String>),
}

impl StepStatus {
    /// Lowercase label used by every report format.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed(_) => "failed",
            Self::Skipped => "skipped",
            Self::Undefined => "undefined",
            Self::Pending(_) => "pending",
        }
    }
}

/// Recorded outcome of one step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepRecord {
    /// Keyword as written.
    pub keyword: StepKeyword,
    /// Step text.
    pub text: String,
    /// Line in the feature file.
    pub line: usize,
    /// Outcome.
    pub status: StepStatus,
    /// Wall-clock time spent in the handler.
    pub duration: Duration,
}

/// Status of a whole scenario.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScenarioStatus {
    /// Every step passed.
    Passed,
    /// A step failed, was undefined or ambiguous, or the scenario could not
    /// start.
    Failed(String),
    /// A step was pending, so the rest of the scenario did not run.
    Skipped(SkippedScenario),
}

impl ScenarioStatus {
    /// Lowercase label for the status.
    ///
    /// # Examples
    /// ```
    /// use weaver_bdd::ScenarioStatus;
    ///
    /// assert_eq!(ScenarioStatus::Passed.label(), "passed");
    /// ```
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed(_) => "failed",
            Self::Skipped(_) => "skipped",
        }
    }
}

/// Details captured when a scenario skips.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedScenario {
    message: Option<String>,
    forced_failure: bool,
}

impl SkippedScenario {
    /// Create a skip record.
    #[must_use]
    pub fn new(message: Option<String>, forced_failure: bool) -> Self {
        Self {
            message,
            forced_failure,
        }
    }

    /// Reason given by the pending step, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Whether the run treats this skip as a failure.
    #[must_use]
    pub fn forced_failure(&self) -> bool {
        self.forced_failure
    }
}

/// Recorded outcome of one scenario.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScenarioRecord {
    feature_path: String,
    feature_name: String,
    scenario_name: String,
    line: usize,
    tags: Vec<String>,
    steps: Vec<StepRecord>,
    status: ScenarioStatus,
    duration: Duration,
}

impl ScenarioRecord {
    /// Construct a record.
    ///
    /// # Examples
    /// ```
    /// use std::time::Duration;
    /// use weaver_bdd::{ScenarioRecord, ScenarioStatus};
    ///
    /// let record = ScenarioRecord::new(
    ///     "features/front_page.feature",
    ///     "Front page",
    ///     "I see company logo",
    ///     14,
    ///     Vec::new(),
    /// )
    /// .finish(Vec::new(), ScenarioStatus::Passed, Duration::ZERO);
    /// assert_eq!(record.scenario_name(), "I see company logo");
    /// assert!(record.status().label() == "passed");
    /// ```
    #[must_use]
    pub fn new(
        feature_path: impl Into<String>,
        feature_name: impl Into<String>,
        scenario_name: impl Into<String>,
        line: usize,
        tags: impl Into<Vec<String>>,
    ) -> ScenarioRecordBuilder {
        ScenarioRecordBuilder {
            feature_path: feature_path.into(),
            feature_name: feature_name.into(),
            scenario_name: scenario_name.into(),
            line,
            tags: tags.into(),
        }
    }

    /// Feature file path.
    #[must_use]
    pub fn feature_path(&self) -> &str {
        &self.feature_path
    }

    /// Feature title.
    #[must_use]
    pub fn feature_name(&self) -> &str {
        &self.feature_name
    }

    /// Scenario name, including the examples row for outlines.
    #[must_use]
    pub fn scenario_name(&self) -> &str {
        &self.scenario_name
    }

    /// Line of the scenario header.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    /// Scenario tags.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Per-step outcomes in execution order.
    #[must_use]
    pub fn steps(&self) -> &[StepRecord] {
        &self.steps
    }

    /// Scenario outcome.
    #[must_use]
    pub fn status(&self) -> &ScenarioStatus {
        &self.status
    }

    /// Wall-clock duration.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Whether the record counts against the run.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        match &self.status {
            ScenarioStatus::Passed => false,
            ScenarioStatus::Failed(_) => true,
            ScenarioStatus::Skipped(details) => details.forced_failure(),
        }
    }
}

/// Scenario metadata waiting for its outcome.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScenarioRecordBuilder {
    feature_path: String,
    feature_name: String,
    scenario_name: String,
    line: usize,
    tags: Vec<String>,
}

impl ScenarioRecordBuilder {
    /// Attach the outcome.
    #[must_use]
    pub fn finish(
        self,
        steps: Vec<StepRecord>,
        status: ScenarioStatus,
        duration: Duration,
    ) -> ScenarioRecord {
        ScenarioRecord {
            feature_path: self.feature_path,
            feature_name: self.feature_name,
            scenario_name: self.scenario_name,
            line: self.line,
            tags: self.tags,
            steps,
            status,
            duration,
        }
    }

    /// Feature path the record will carry.
    #[must_use]
    pub fn feature_path(&self) -> &str {
        &self.feature_path
    }

    /// Scenario name the record will carry.
    #[must_use]
    pub fn scenario_name(&self) -> &str {
        &self.scenario_name
    }
}
