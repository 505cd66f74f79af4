//! Page drivers: the seam between step definitions and the site under test.

mod http;
mod page;

use std::future::Future;

use url::Url;

use crate::error::DriverError;

pub use http::{DriverConfig, HttpDriver};
pub use page::{Form, FormMethod, Image, Page};

/// Outcome of fetching a resource without navigating to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    /// Final URL after redirects.
    pub url: Url,
    /// HTTP status code.
    pub status: u16,
    /// `Content-Type` header, when sent.
    pub content_type: Option<String>,
    /// Body length in bytes.
    pub len: usize,
}

impl Resource {
    /// Whether the status is 2xx.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Browses the site on behalf of one scenario.
///
/// A driver owns its session state (cookies and the current page), so each
/// scenario builds its own.
pub trait PageDriver: Send {
    /// Navigate to `url`, following redirects, and make the response the
    /// current page. Error statuses still produce a page.
    fn visit(&mut self, url: Url) -> impl Future<Output = Result<&Page, DriverError>> + Send;

    /// The current page.
    ///
    /// # Errors
    /// Returns [`DriverError::NoPage`] before the first navigation.
    fn page(&self) -> Result<&Page, DriverError>;

    /// Request `url` without changing the current page.
    fn fetch(&self, url: Url) -> impl Future<Output = Result<Resource, DriverError>> + Send;

    /// Submit `form` and make the response the current page.
    fn submit(&mut self, form: Form) -> impl Future<Output = Result<&Page, DriverError>> + Send;
}
