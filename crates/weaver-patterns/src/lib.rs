//! Step keywords and step-pattern compilation for the Note Weaver suite.
//!
//! Step definitions are written as plain phrases with `{name}` placeholders,
//! for example `I see a link to "{link}"`. This crate turns those phrases into
//! anchored regular expressions, extracts placeholder values from step text
//! and ranks competing patterns so the runner can pick the most specific
//! definition for a step.

mod capture;
mod errors;
mod hint;
mod keyword;
mod pattern;
mod specificity;

pub use capture::extract_captured_values;
pub use errors::PatternError;
pub use hint::TypeHint;
pub use keyword::{StepKeyword, StepKeywordParseError};
pub use pattern::{StepPattern, build_regex_from_pattern, compile_regex_from_pattern};
pub use specificity::SpecificityScore;
