//! Turn lexed tokens into anchored regular-expression source.

use std::collections::HashSet;

use crate::errors::PatternError;
use crate::hint::TypeHint;

use super::lexer::{Token, lex_pattern};

/// Build the anchored regex source for a step pattern.
///
/// # Errors
/// Returns [`PatternError`] when the pattern contains malformed placeholders,
/// stray braces or repeats a placeholder name.
///
/// # Examples
/// ```
/// use weaver_patterns::build_regex_from_pattern;
///
/// let source = build_regex_from_pattern(r#"I see the text "{text}""#).unwrap();
/// assert_eq!(source, r#"^I see the text "(.+?)"$"#);
/// ```
pub fn build_regex_from_pattern(pat: &str) -> Result<String, PatternError> {
    regex_source(&lex_pattern(pat)?)
}

pub(crate) fn regex_source(tokens: &[Token]) -> Result<String, PatternError> {
    let mut seen = HashSet::new();
    let mut source = String::from("^");
    for token in tokens {
        match token {
            Token::Literal(text) => source.push_str(&regex::escape(text)),
            Token::Placeholder(placeholder) => {
                if !seen.insert(placeholder.name.as_str()) {
                    return Err(PatternError::DuplicatePlaceholder {
                        name: placeholder.name.clone(),
                        offset: placeholder.offset,
                    });
                }
                let fragment = placeholder
                    .hint
                    .map_or(TypeHint::untyped_fragment(), TypeHint::regex_fragment);
                source.push('(');
                source.push_str(fragment);
                source.push(')');
            }
        }
    }
    source.push('$');
    Ok(source)
}
