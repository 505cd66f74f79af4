//! `reqwest`-backed driver. It reads server-rendered HTML and runs no
//! scripts.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, Response};
use tracing::debug;
use url::Url;

use super::{Form, FormMethod, Page, PageDriver, Resource};
use crate::error::DriverError;

/// Settings for [`HttpDriver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    /// Per-request timeout.
    pub timeout: Duration,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: concat!("note-weaver/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Driver speaking HTTP with a private cookie jar.
#[derive(Debug)]
pub struct HttpDriver {
    client: Client,
    page: Option<Page>,
}

impl HttpDriver {
    /// Build a driver with a fresh cookie jar.
    ///
    /// # Errors
    /// Returns [`DriverError::Client`] when the TLS backend or client fails
    /// to initialise.
    pub fn new(config: &DriverConfig) -> Result<Self, DriverError> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(DriverError::Client)?;
        Ok(Self { client, page: None })
    }

    async fn send(request: RequestBuilder, url: &Url) -> Result<Response, DriverError> {
        request.send().await.map_err(|source| DriverError::Request {
            url: url.to_string(),
            source,
        })
    }

    async fn load(&mut self, request: RequestBuilder, url: &Url) -> Result<&Page, DriverError> {
        let response = Self::send(request, url).await?;
        let final_url = response.url().clone();
        let status = response.status().as_u16();
        let content_type = content_type(&response);
        let body = response.text().await.map_err(|source| DriverError::Request {
            url: final_url.to_string(),
            source,
        })?;
        debug!(requested = %url, landed = %final_url, status, "loaded page");
        Ok(self
            .page
            .insert(Page::new(final_url, status, content_type, body)))
    }
}

fn content_type(response: &Response) -> Option<String> {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

impl PageDriver for HttpDriver {
    async fn visit(&mut self, url: Url) -> Result<&Page, DriverError> {
        let request = self.client.get(url.clone());
        self.load(request, &url).await
    }

    fn page(&self) -> Result<&Page, DriverError> {
        self.page.as_ref().ok_or(DriverError::NoPage)
    }

    async fn fetch(&self, url: Url) -> Result<Resource, DriverError> {
        let response = Self::send(self.client.get(url.clone()), &url).await?;
        let final_url = response.url().clone();
        let status = response.status().as_u16();
        let content_type = content_type(&response);
        let body = response.bytes().await.map_err(|source| DriverError::Request {
            url: final_url.to_string(),
            source,
        })?;
        debug!(requested = %url, status, len = body.len(), "fetched resource");
        Ok(Resource {
            url: final_url,
            status,
            content_type,
            len: body.len(),
        })
    }

    async fn submit(&mut self, form: Form) -> Result<&Page, DriverError> {
        let action = form.action().clone();
        let pairs = form.pairs();
        let request = match form.method() {
            FormMethod::Post => self.client.post(action.clone()).form(&pairs),
            FormMethod::Get => self.client.get(action.clone()).query(&pairs),
        };
        self.load(request, &action).await
    }
}
