//! Placeholder body parsing.

use crate::errors::PatternError;
use crate::hint::TypeHint;

use super::lexer::PatternChars;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Placeholder {
    pub name: String,
    pub hint: Option<TypeHint>,
    pub offset: usize,
}

/// Consume characters up to and including the closing brace of the
/// placeholder opened at `offset`.
pub(crate) fn read_placeholder(
    chars: &mut PatternChars<'_>,
    offset: usize,
) -> Result<Placeholder, PatternError> {
    let mut body = String::new();
    loop {
        match chars.next() {
            Some((_, '}')) => break,
            Some((_, '{')) => {
                return Err(invalid(&body, offset, "nested braces are not allowed"));
            }
            Some((_, ch)) => body.push(ch),
            None => return Err(PatternError::UnclosedPlaceholder { offset }),
        }
    }

    let (name, hint) = match body.split_once(':') {
        Some((name, hint)) => (name, Some(hint)),
        None => (body.as_str(), None),
    };
    validate_name(name, offset)?;

    let hint = hint
        .map(|code| {
            if code.is_empty() {
                return Err(invalid(name, offset, "type hint is empty"));
            }
            code.parse::<TypeHint>()
                .map_err(|hint| PatternError::UnknownTypeHint {
                    name: name.to_string(),
                    hint,
                    offset,
                })
        })
        .transpose()?;

    Ok(Placeholder {
        name: name.to_string(),
        hint,
        offset,
    })
}

fn validate_name(name: &str, offset: usize) -> Result<(), PatternError> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err(invalid(name, offset, "placeholder name is empty"));
    };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return Err(invalid(
            name,
            offset,
            "name must start with a letter or underscore",
        ));
    }
    if !chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_') {
        return Err(invalid(
            name,
            offset,
            "name may only contain letters, digits and underscores",
        ));
    }
    Ok(())
}

fn invalid(name: &str, offset: usize, reason: &'static str) -> PatternError {
    PatternError::InvalidPlaceholder {
        name: name.to_string(),
        offset,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn read(body: &str) -> Result<Placeholder, PatternError> {
        // Position the iterator just after the opening brace, as the lexer does.
        let mut chars = body.char_indices().peekable();
        chars.next();
        read_placeholder(&mut chars, 0)
    }

    #[test]
    fn reads_plain_placeholder() {
        let placeholder = read("{text}").unwrap_or_else(|err| panic!("should parse: {err}"));
        assert_eq!(placeholder.name, "text");
        assert_eq!(placeholder.hint, None);
    }

    #[test]
    fn reads_hinted_placeholder() {
        let placeholder = read("{count:d}").unwrap_or_else(|err| panic!("should parse: {err}"));
        assert_eq!(placeholder.hint, Some(TypeHint::Integer));
    }

    #[rstest]
    #[case("{}", "placeholder name is empty")]
    #[case("{1st}", "name must start with a letter or underscore")]
    #[case("{the link}", "name may only contain letters, digits and underscores")]
    #[case("{n:}", "type hint is empty")]
    #[case("{a{b}}", "nested braces are not allowed")]
    fn rejects_malformed_bodies(#[case] body: &str, #[case] reason: &str) {
        match read(body) {
            Err(PatternError::InvalidPlaceholder { reason: got, .. }) => assert_eq!(got, reason),
            other => panic!("expected invalid placeholder for {body:?}, got {other:?}"),
        }
    }

    #[test]
    fn reports_unknown_hint() {
        match read("{n:u32}") {
            Err(PatternError::UnknownTypeHint { name, hint, .. }) => {
                assert_eq!(name, "n");
                assert_eq!(hint, "u32");
            }
            other => panic!("expected unknown hint, got {other:?}"),
        }
    }

    #[test]
    fn reports_unclosed_placeholder() {
        assert!(matches!(
            read("{text"),
            Err(PatternError::UnclosedPlaceholder { offset: 0 })
        ));
    }
}
