//! Ranking of step patterns that match the same text.
//!
//! A step such as `I can see the text "About Us"` may match both a generic
//! `I can see the text "{text}"` and a dedicated literal definition. The
//! runner keeps the highest-scoring candidate and reports a tie as an
//! ambiguity.

use std::cmp::Ordering;

use crate::errors::PatternError;
use crate::pattern::lexer::{Token, lex_pattern};

/// Specificity of a step pattern.
///
/// Scores order by, in turn: more literal characters, fewer placeholders,
/// more typed placeholders.
///
/// # Examples
///
/// ```
/// use weaver_patterns::SpecificityScore;
///
/// let literal = SpecificityScore::calculate("I see the company name").unwrap();
/// let generic = SpecificityScore::calculate("I see the {thing}").unwrap();
/// assert!(literal > generic);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpecificityScore {
    /// Literal characters, counted as chars rather than bytes.
    pub literal_chars: usize,
    /// Placeholders in the pattern.
    pub placeholder_count: usize,
    /// Placeholders carrying a type hint.
    pub typed_placeholder_count: usize,
}

impl SpecificityScore {
    /// Score a pattern string.
    ///
    /// # Errors
    /// Returns [`PatternError`] when the pattern does not lex.
    pub fn calculate(pattern: &str) -> Result<Self, PatternError> {
        Ok(Self::from_tokens(&lex_pattern(pattern)?))
    }

    pub(crate) fn from_tokens(tokens: &[Token]) -> Self {
        tokens.iter().fold(Self::default(), |mut score, token| {
            match token {
                Token::Literal(text) => score.literal_chars += text.chars().count(),
                Token::Placeholder(placeholder) => {
                    score.placeholder_count += 1;
                    if placeholder.hint.is_some() {
                        score.typed_placeholder_count += 1;
                    }
                }
            }
            score
        })
    }
}

impl Ord for SpecificityScore {
    fn cmp(&self, other: &Self) -> Ordering {
        self.literal_chars
            .cmp(&other.literal_chars)
            .then_with(|| other.placeholder_count.cmp(&self.placeholder_count))
            .then_with(|| {
                self.typed_placeholder_count
                    .cmp(&other.typed_placeholder_count)
            })
    }
}

impl PartialOrd for SpecificityScore {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
