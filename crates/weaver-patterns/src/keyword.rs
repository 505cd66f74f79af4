//! Gherkin step keywords.

use gherkin::StepType;
use std::fmt;
use std::str::FromStr;

/// Keyword opening a scenario step.
///
/// `And` and `But` carry no meaning of their own; the runner resolves them to
/// the primary keyword of the step before them with [`StepKeyword::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StepKeyword {
    /// Precondition, typically navigation.
    Given,
    /// Action performed by the user.
    When,
    /// Expected outcome.
    Then,
    /// Continues the previous keyword.
    And,
    /// Contrasting continuation of the previous keyword.
    But,
}

impl StepKeyword {
    /// Canonical spelling of the keyword.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Given => "Given",
            Self::When => "When",
            Self::Then => "Then",
            Self::And => "And",
            Self::But => "But",
        }
    }

    /// Whether this keyword only continues its predecessor.
    #[must_use]
    pub const fn is_conjunction(&self) -> bool {
        matches!(self, Self::And | Self::But)
    }

    /// Resolve a conjunction against the previous primary keyword.
    ///
    /// Primary keywords are returned unchanged and recorded in `prev`.
    /// Conjunctions return the recorded keyword, or `Given` when the scenario
    /// opens with one.
    ///
    /// # Examples
    ///
    /// ```
    /// use weaver_patterns::StepKeyword;
    ///
    /// let mut prev = None;
    /// assert_eq!(StepKeyword::Then.resolve(&mut prev), StepKeyword::Then);
    /// assert_eq!(StepKeyword::And.resolve(&mut prev), StepKeyword::Then);
    /// ```
    #[must_use]
    pub fn resolve(self, prev: &mut Option<Self>) -> Self {
        if self.is_conjunction() {
            return prev.unwrap_or(Self::Given);
        }
        *prev = Some(self);
        self
    }

    /// Classify a step as written in a feature file.
    ///
    /// The textual keyword wins when it is a conjunction so `And` survives
    /// parsing; otherwise the parser's step type decides.
    #[must_use]
    pub fn from_gherkin(keyword: &str, ty: StepType) -> Self {
        match keyword.trim().parse::<Self>() {
            Ok(kw) if kw.is_conjunction() => kw,
            _ => Self::from(ty),
        }
    }
}

impl fmt::Display for StepKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<StepType> for StepKeyword {
    fn from(ty: StepType) -> Self {
        match ty {
            StepType::Given => Self::Given,
            StepType::When => Self::When,
            StepType::Then => Self::Then,
        }
    }
}

/// Text that does not name a step keyword.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid step keyword: {0}")]
pub struct StepKeywordParseError(pub String);

impl FromStr for StepKeyword {
    type Err = StepKeywordParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        [Self::Given, Self::When, Self::Then, Self::And, Self::But]
            .into_iter()
            .find(|kw| kw.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| StepKeywordParseError(trimmed.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Given", StepKeyword::Given)]
    #[case(" when ", StepKeyword::When)]
    #[case("THEN", StepKeyword::Then)]
    #[case("and", StepKeyword::And)]
    #[case("But", StepKeyword::But)]
    fn parses_case_insensitively(#[case] input: &str, #[case] expected: StepKeyword) {
        assert_eq!(input.parse::<StepKeyword>(), Ok(expected));
    }

    #[test]
    fn rejects_unknown_keyword() {
        let Err(err) = "Whenever".parse::<StepKeyword>() else {
            panic!("unknown keyword must not parse");
        };
        assert_eq!(err.to_string(), "invalid step keyword: Whenever");
    }

    #[rstest]
    #[case("And ", StepType::Then, StepKeyword::And)]
    #[case("But", StepType::Given, StepKeyword::But)]
    #[case("Then ", StepType::Then, StepKeyword::Then)]
    #[case("Angenommen ", StepType::Given, StepKeyword::Given)]
    fn classifies_gherkin_steps(
        #[case] keyword: &str,
        #[case] ty: StepType,
        #[case] expected: StepKeyword,
    ) {
        assert_eq!(StepKeyword::from_gherkin(keyword, ty), expected);
    }

    #[test]
    fn conjunction_inherits_previous_keyword() {
        let mut prev = Some(StepKeyword::Given);
        assert_eq!(StepKeyword::And.resolve(&mut prev), StepKeyword::Given);
        assert_eq!(StepKeyword::Then.resolve(&mut prev), StepKeyword::Then);
        assert_eq!(StepKeyword::But.resolve(&mut prev), StepKeyword::Then);
        assert_eq!(prev, Some(StepKeyword::Then));
    }

    #[test]
    fn leading_conjunction_defaults_to_given() {
        let mut prev = None;
        assert_eq!(StepKeyword::And.resolve(&mut prev), StepKeyword::Given);
        assert_eq!(prev, None);
    }
}
