//! Tag expressions for selecting scenarios.
//!
//! Expressions combine `@tag` atoms with `not`, `and`, `or` and parentheses,
//! for example `@smoke and not (@wip or @flaky)`. `not` binds tighter than
//! `and`, which binds tighter than `or`; operators are case-insensitive.

mod lexer;
mod parser;

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Parsed tag expression.
///
/// # Examples
/// ```
/// use weaver_bdd::TagExpression;
///
/// let expr: TagExpression = "@smoke and not @wip".parse().unwrap();
/// assert!(expr.matches(["@smoke"]));
/// assert!(!expr.matches(["@smoke", "@wip"]));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagExpression {
    source: String,
    root: Expr,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Expr {
    Tag(String),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

/// A tag expression that failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid tag expression at byte {offset}: {reason}")]
pub struct TagExprError {
    /// Zero-based byte offset of the offending token.
    pub offset: usize,
    /// What the parser expected or found.
    pub reason: String,
}

impl TagExprError {
    fn new(offset: usize, reason: impl Into<String>) -> Self {
        Self {
            offset,
            reason: reason.into(),
        }
    }
}

impl TagExpression {
    /// Parse an expression.
    ///
    /// # Errors
    /// Returns [`TagExprError`] for unknown characters, dangling operators,
    /// unbalanced parentheses or trailing tokens.
    pub fn parse(input: &str) -> Result<Self, TagExprError> {
        let root = parser::Parser::new(input)?.parse_complete()?;
        Ok(Self {
            source: input.trim().to_string(),
            root,
        })
    }

    /// Evaluate against a set of tags. Tags may be given with or without the
    /// leading `@`.
    pub fn matches<'a, I>(&self, tags: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        let set: HashSet<&str> = tags
            .into_iter()
            .map(|tag| tag.strip_prefix('@').unwrap_or(tag))
            .collect();
        self.root.eval(&set)
    }
}

impl Expr {
    fn eval(&self, tags: &HashSet<&str>) -> bool {
        match self {
            Self::Tag(tag) => tags.contains(tag.as_str()),
            Self::Not(inner) => !inner.eval(tags),
            Self::And(lhs, rhs) => lhs.eval(tags) && rhs.eval(tags),
            Self::Or(lhs, rhs) => lhs.eval(tags) || rhs.eval(tags),
        }
    }
}

impl FromStr for TagExpression {
    type Err = TagExprError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TagExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
