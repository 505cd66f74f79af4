//! Error types for step execution failures.

use weaver_patterns::StepKeyword;

use crate::registry::ResolveError;
use crate::step::StepError;

/// Why a step stopped its scenario.
///
/// Pending steps are not errors; they surface as
/// [`StepOutcome::Pending`](crate::StepOutcome::Pending) and skip the rest of
/// the scenario instead of failing it.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ExecutionError {
    /// No definition, or more than one, matches the step.
    #[error("{feature_path}:{line}: {source}")]
    Unbound {
        /// Feature file.
        feature_path: String,
        /// Line of the step.
        line: usize,
        /// Lookup failure.
        #[source]
        source: ResolveError,
    },
    /// The step handler returned an error.
    #[error("{feature_path}:{line}: step '{keyword} {text}' failed: {source}")]
    HandlerFailed {
        /// Feature file.
        feature_path: String,
        /// Line of the step.
        line: usize,
        /// Keyword as written.
        keyword: StepKeyword,
        /// Step text.
        text: String,
        /// Handler error.
        #[source]
        source: StepError,
    },
    /// The per-scenario world could not be created.
    #[error("failed to set up scenario '{scenario}': {message}")]
    WorldSetup {
        /// Scenario name.
        scenario: String,
        /// Factory error text.
        message: String,
    },
    /// The scenario task panicked.
    #[error("scenario '{scenario}' panicked: {message}")]
    Panicked {
        /// Scenario name.
        scenario: String,
        /// Panic payload text.
        message: String,
    },
}

impl ExecutionError {
    /// Whether the failure is a missing definition rather than an ambiguity
    /// or a handler error.
    #[must_use]
    pub fn is_undefined(&self) -> bool {
        matches!(
            self,
            Self::Unbound {
                source: ResolveError::Undefined { .. },
                ..
            }
        )
    }
}
