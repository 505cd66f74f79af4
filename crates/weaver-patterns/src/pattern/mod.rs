//! Step-pattern lexing and compilation.

mod compiler;
pub(crate) mod lexer;
mod placeholder;

use std::fmt;

use regex::Regex;

use crate::capture::extract_captured_values;
use crate::errors::PatternError;
use crate::specificity::SpecificityScore;

pub use compiler::build_regex_from_pattern;

/// Build and compile the regex for a step pattern.
///
/// # Errors
/// Returns [`PatternError`] when the pattern is malformed or the generated
/// source fails to compile.
pub fn compile_regex_from_pattern(pat: &str) -> Result<Regex, PatternError> {
    Ok(Regex::new(&build_regex_from_pattern(pat)?)?)
}

/// A compiled step pattern.
///
/// # Examples
/// ```
/// use weaver_patterns::StepPattern;
///
/// let pattern = StepPattern::new(r#"I see the text "{text}""#).unwrap();
/// assert_eq!(pattern.placeholders(), ["text"]);
/// assert_eq!(
///     pattern.captures(r#"I see the text "Welcome to Note Weaver!""#),
///     Some(vec!["Welcome to Note Weaver!".to_string()]),
/// );
/// ```
#[derive(Debug, Clone)]
pub struct StepPattern {
    source: String,
    regex: Regex,
    placeholders: Vec<String>,
    specificity: SpecificityScore,
}

impl StepPattern {
    /// Compile `source` into a step pattern.
    ///
    /// # Errors
    /// Returns [`PatternError`] when the pattern is malformed.
    pub fn new(source: impl Into<String>) -> Result<Self, PatternError> {
        let source = source.into();
        let tokens = lexer::lex_pattern(&source)?;
        let regex = Regex::new(&compiler::regex_source(&tokens)?)?;
        let placeholders = tokens
            .iter()
            .filter_map(|token| match token {
                lexer::Token::Placeholder(placeholder) => Some(placeholder.name.clone()),
                lexer::Token::Literal(_) => None,
            })
            .collect();
        let specificity = SpecificityScore::from_tokens(&tokens);
        Ok(Self {
            source,
            regex,
            placeholders,
            specificity,
        })
    }

    /// Pattern text as written by the step author.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Compiled, anchored regex.
    #[must_use]
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Placeholder names in declaration order.
    #[must_use]
    pub fn placeholders(&self) -> &[String] {
        &self.placeholders
    }

    /// Ranking used to break ties between matching patterns.
    #[must_use]
    pub fn specificity(&self) -> SpecificityScore {
        self.specificity
    }

    /// Whether `text` matches the whole pattern.
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Placeholder values captured from `text`, or `None` on a mismatch.
    #[must_use]
    pub fn captures(&self, text: &str) -> Option<Vec<String>> {
        extract_captured_values(&self.regex, text)
    }

    /// Whitespace-normalised text used to detect duplicate definitions.
    ///
    /// Placeholder names do not matter for duplication, so every placeholder
    /// collapses to `{}` (keeping its hint).
    #[must_use]
    pub fn normalised(&self) -> String {
        let collapsed = self.source.split_whitespace().collect::<Vec<_>>().join(" ");
        match lexer::lex_pattern(&collapsed) {
            Ok(tokens) => tokens
                .iter()
                .map(|token| match token {
                    lexer::Token::Literal(text) => text.clone(),
                    lexer::Token::Placeholder(placeholder) => placeholder
                        .hint
                        .map_or_else(|| "{}".to_string(), |hint| format!("{{:{hint}}}")),
                })
                .collect(),
            Err(_) => collapsed,
        }
    }
}

impl fmt::Display for StepPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl PartialEq for StepPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for StepPattern {}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(source: &str) -> StepPattern {
        StepPattern::new(source).unwrap_or_else(|err| panic!("{source:?} should compile: {err}"))
    }

    #[test]
    fn compiles_literal_pattern() {
        let regex = compile_regex_from_pattern("I see the navigation bar")
            .unwrap_or_else(|err| panic!("pattern should compile: {err}"));
        assert_eq!(regex.as_str(), "^I see the navigation bar$");
    }

    #[test]
    fn rejects_partial_matches() {
        let nav = pattern("I see the navigation bar");
        assert!(nav.is_match("I see the navigation bar"));
        assert!(!nav.is_match("I see the navigation bar twice"));
    }

    #[test]
    fn captures_quoted_url() {
        let link = pattern(r#"I see a link to "{link}""#);
        assert_eq!(
            link.captures(r#"I see a link to "https://github.com/DataByne/uraPointOfSale""#),
            Some(vec!["https://github.com/DataByne/uraPointOfSale".to_string()])
        );
    }

    #[test]
    fn normalises_whitespace_and_names() {
        assert_eq!(
            pattern("I  see {a}  and {b:d}").normalised(),
            pattern("I see {x} and {y:d}").normalised()
        );
        assert_eq!(pattern("I see {a}").normalised(), "I see {}");
    }

    #[test]
    fn equality_follows_source_text() {
        assert_eq!(pattern("I see {a}"), pattern("I see {a}"));
        assert_ne!(pattern("I see {a}"), pattern("I see {b}"));
    }
}
