//! Errors raised while turning step patterns into regular expressions.

use thiserror::Error;

/// Failure to compile a step pattern.
///
/// Offsets are zero-based byte positions within the pattern text.
///
/// # Examples
/// ```
/// use weaver_patterns::{PatternError, build_regex_from_pattern};
///
/// let err = build_regex_from_pattern("I see {").unwrap_err();
/// assert!(matches!(err, PatternError::UnclosedPlaceholder { offset: 6 }));
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PatternError {
    /// A `{` opened a placeholder that never closed.
    #[error("missing closing '}}' for placeholder starting at byte {offset}")]
    UnclosedPlaceholder {
        /// Offset of the opening brace.
        offset: usize,
    },
    /// A brace appeared outside a placeholder without being doubled.
    #[error("stray '{brace}' at byte {offset}; write '{brace}{brace}' for a literal brace")]
    StrayBrace {
        /// The offending brace character.
        brace: char,
        /// Offset of the brace.
        offset: usize,
    },
    /// A placeholder name or hint contained characters outside the grammar.
    #[error("invalid placeholder `{name}` at byte {offset}: {reason}")]
    InvalidPlaceholder {
        /// Placeholder name as written, possibly empty.
        name: String,
        /// Offset of the opening brace.
        offset: usize,
        /// Short description of the violation.
        reason: &'static str,
    },
    /// A placeholder used a type hint this crate does not understand.
    #[error("unknown type hint `{hint}` for placeholder `{name}` at byte {offset}")]
    UnknownTypeHint {
        /// Placeholder name.
        name: String,
        /// The hint as written.
        hint: String,
        /// Offset of the opening brace.
        offset: usize,
    },
    /// The same placeholder name was used twice in one pattern.
    #[error("duplicate placeholder `{name}` at byte {offset}")]
    DuplicatePlaceholder {
        /// Placeholder name.
        name: String,
        /// Offset of the second occurrence.
        offset: usize,
    },
    /// The generated regular expression failed to compile.
    #[error(transparent)]
    Regex(#[from] regex::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_stray_brace_with_escape_hint() {
        let err = PatternError::StrayBrace {
            brace: '}',
            offset: 4,
        };
        assert_eq!(
            err.to_string(),
            "stray '}' at byte 4; write '}}' for a literal brace"
        );
    }

    #[test]
    fn describes_invalid_placeholder() {
        let err = PatternError::InvalidPlaceholder {
            name: "link".into(),
            offset: 2,
            reason: "whitespace is not allowed",
        };
        assert_eq!(
            err.to_string(),
            "invalid placeholder `link` at byte 2: whitespace is not allowed"
        );
    }

    #[test]
    fn forwards_regex_error_display() {
        let err = PatternError::Regex(regex::Error::Syntax("bad".into()));
        assert_eq!(
            err.to_string(),
            regex::Error::Syntax("bad".into()).to_string()
        );
    }
}
