//! Placeholder type hints.

use std::fmt;
use std::str::FromStr;

/// Narrows what a placeholder may capture.
///
/// Hints follow the short format codes used by Gherkin step libraries:
/// `{count:d}` captures a signed integer, `{name:w}` a run of word characters
/// and `{token:S}` anything without whitespace. Untyped placeholders capture
/// lazily up to the next literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeHint {
    /// Optional sign followed by ASCII digits.
    Integer,
    /// Letters, digits and underscores.
    Word,
    /// Any run of non-whitespace characters.
    NonSpace,
}

impl TypeHint {
    /// Regex fragment matched by a placeholder carrying this hint.
    ///
    /// # Examples
    /// ```
    /// use weaver_patterns::TypeHint;
    ///
    /// assert_eq!(TypeHint::Integer.regex_fragment(), r"[+-]?\d+");
    /// ```
    #[must_use]
    pub const fn regex_fragment(self) -> &'static str {
        match self {
            Self::Integer => r"[+-]?\d+",
            Self::Word => r"\w+",
            Self::NonSpace => r"\S+",
        }
    }

    /// Fragment for an untyped placeholder.
    #[must_use]
    pub const fn untyped_fragment() -> &'static str {
        r".+?"
    }

    /// The format code as written in a pattern.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Integer => "d",
            Self::Word => "w",
            Self::NonSpace => "S",
        }
    }
}

impl fmt::Display for TypeHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for TypeHint {
    type Err = String;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        match code {
            "d" => Ok(Self::Integer),
            "w" => Ok(Self::Word),
            "S" => Ok(Self::NonSpace),
            other => Err(other.to_string()),
        }
    }
}
