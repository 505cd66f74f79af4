//! Step handler signatures, arguments and outcomes.

use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;

/// Outcome reported by a step handler that did not fail.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StepOutcome {
    /// The step ran to completion.
    #[default]
    Done,
    /// The step exists but is not implemented yet. The scenario is skipped.
    Pending(Option<String>),
}

impl StepOutcome {
    /// Shorthand for a pending outcome with a reason.
    #[must_use]
    pub fn pending(reason: impl Into<String>) -> Self {
        Self::Pending(Some(reason.into()))
    }
}

/// Failure raised by a step handler.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StepError {
    /// An expectation about the application did not hold.
    #[error("{0}")]
    Assertion(String),
    /// The pattern did not capture a placeholder the handler asked for.
    #[error("missing step argument '{0}'")]
    MissingArgument(String),
    /// A captured value could not be converted.
    #[error("invalid step argument '{name}': {reason}")]
    InvalidArgument {
        /// Placeholder name.
        name: String,
        /// Conversion failure.
        reason: String,
    },
    /// Any other error surfaced by the handler, typically a driver failure.
    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl StepError {
    /// Build an assertion failure.
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::Assertion(message.into())
    }

    /// Wrap an arbitrary error.
    pub fn other(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Other(Box::new(err))
    }
}

/// Result returned by every step handler.
pub type StepResult = Result<StepOutcome, StepError>;

/// Boxed future returned by a step handler borrowing the world and arguments
/// for `'a`.
pub type StepFuture<'a> = Pin<Box<dyn Future<Output = StepResult> + Send + 'a>>;

/// Type-erased step handler over world type `W`.
pub type StepHandler<W> =
    Arc<dyn for<'a> Fn(&'a mut W, &'a StepArgs) -> StepFuture<'a> + Send + Sync>;

/// Values handed to a step handler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepArgs {
    names: Vec<String>,
    values: Vec<String>,
    docstring: Option<String>,
    table: Option<Vec<Vec<String>>>,
}

impl StepArgs {
    /// Pair placeholder names with captured values.
    #[must_use]
    pub fn new(names: Vec<String>, values: Vec<String>) -> Self {
        Self {
            names,
            values,
            docstring: None,
            table: None,
        }
    }

    /// Attach the step's doc string and data table.
    #[must_use]
    pub fn with_attachments(
        mut self,
        docstring: Option<String>,
        table: Option<Vec<Vec<String>>>,
    ) -> Self {
        self.docstring = docstring;
        self.table = table;
        self
    }

    /// Captured value by position.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }

    /// Captured value by placeholder name.
    #[must_use]
    pub fn named(&self, name: &str) -> Option<&str> {
        let index = self.names.iter().position(|candidate| candidate == name)?;
        self.get(index)
    }

    /// Captured value by placeholder name, failing the step when absent.
    ///
    /// # Errors
    /// Returns [`StepError::MissingArgument`] when no placeholder has `name`.
    pub fn require(&self, name: &str) -> Result<&str, StepError> {
        self.named(name)
            .ok_or_else(|| StepError::MissingArgument(name.to_string()))
    }

    /// Parse a captured value.
    ///
    /// # Errors
    /// Returns [`StepError::MissingArgument`] or
    /// [`StepError::InvalidArgument`].
    pub fn parse<T>(&self, name: &str) -> Result<T, StepError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.require(name)?
            .parse()
            .map_err(|err: T::Err| StepError::InvalidArgument {
                name: name.to_string(),
                reason: err.to_string(),
            })
    }

    /// Doc string attached to the step.
    #[must_use]
    pub fn docstring(&self) -> Option<&str> {
        self.docstring.as_deref()
    }

    /// Data table attached to the step.
    #[must_use]
    pub fn table(&self) -> Option<&[Vec<String>]> {
        self.table.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn args() -> StepArgs {
        StepArgs::new(
            vec!["link".into(), "count".into()],
            vec!["https://www.kent.edu/cs".into(), "3".into()],
        )
    }

    #[rstest]
    fn looks_up_by_name_and_position(args: StepArgs) {
        assert_eq!(args.named("link"), Some("https://www.kent.edu/cs"));
        assert_eq!(args.get(1), Some("3"));
        assert_eq!(args.named("missing"), None);
    }

    #[rstest]
    fn parses_typed_values(args: StepArgs) {
        assert!(matches!(args.parse::<u32>("count"), Ok(3)));
        assert!(matches!(
            args.parse::<u32>("link"),
            Err(StepError::InvalidArgument { ref name, .. }) if name == "link"
        ));
        assert!(matches!(
            args.require("text"),
            Err(StepError::MissingArgument(ref name)) if name == "text"
        ));
    }

    #[test]
    fn pending_carries_reason() {
        assert_eq!(
            StepOutcome::pending("login flow"),
            StepOutcome::Pending(Some("login flow".into()))
        );
        assert_eq!(StepOutcome::default(), StepOutcome::Done);
    }
}
