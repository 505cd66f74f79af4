//! Errors raised by page drivers.

use thiserror::Error;

/// Failure to reach or interpret a page.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DriverError {
    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    /// A request failed before a response arrived.
    #[error("request to {url} failed: {source}")]
    Request {
        /// Requested URL.
        url: String,
        /// Transport error.
        #[source]
        source: reqwest::Error,
    },
    /// A URL could not be parsed or joined.
    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        /// Offending text.
        url: String,
        /// Parser error.
        #[source]
        source: url::ParseError,
    },
    /// A CSS selector is malformed.
    #[error("invalid CSS selector '{selector}': {reason}")]
    InvalidSelector {
        /// Selector text.
        selector: String,
        /// Parser message.
        reason: String,
    },
    /// A query was made before any page was loaded.
    #[error("no page has been loaded")]
    NoPage,
    /// The current page has no form matching the selector.
    #[error("no form matches '{0}' on the current page")]
    FormNotFound(String),
}

impl From<DriverError> for weaver_bdd::StepError {
    fn from(err: DriverError) -> Self {
        Self::other(err)
    }
}
