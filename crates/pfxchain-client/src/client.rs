//! HTTP implementation of [`IssuerFetcher`].

use crate::config::FetchConfig;
use crate::fetcher::IssuerFetcher;
use async_trait::async_trait;
use pfxchain_core::{parse_fetched, Certificate, ChainError, Result};
use reqwest::Client as HttpClient;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Fetches issuer certificates over HTTP(S).
///
/// Cloning is cheap; clones share one connection pool.
#[derive(Clone)]
pub struct HttpFetcher {
    inner: Arc<FetcherInner>,
}

struct FetcherInner {
    http: HttpClient,
    max_body_size: usize,
}

impl HttpFetcher {
    /// Create a fetcher with default settings
    pub fn new() -> Result<Self> {
        HttpFetcherBuilder::new().build()
    }

    /// Create a builder for custom configuration
    #[must_use]
    pub fn builder() -> HttpFetcherBuilder {
        HttpFetcherBuilder::new()
    }

    /// Perform the GET and return the body bytes, enforcing status and size.
    async fn get_body(&self, url: &str) -> Result<Vec<u8>> {
        let parsed = validate_url(url)?;
        debug!(url = %parsed, "GET issuer certificate");

        let mut response = self
            .inner
            .http
            .get(parsed)
            .send()
            .await
            .map_err(|e| map_transport_error(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChainError::Status {
                code: status.as_u16(),
                url: url.to_string(),
            });
        }

        let limit = self.inner.max_body_size;
        if response
            .content_length()
            .is_some_and(|len| len > limit as u64)
        {
            return Err(ChainError::BodyTooLarge {
                url: url.to_string(),
                limit,
            });
        }

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| map_transport_error(url, &e))?
        {
            if body.len() + chunk.len() > limit {
                return Err(ChainError::BodyTooLarge {
                    url: url.to_string(),
                    limit,
                });
            }
            body.extend_from_slice(&chunk);
        }

        debug!(url, bytes = body.len(), "issuer certificate downloaded");
        Ok(body)
    }
}

#[async_trait]
impl IssuerFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Certificate> {
        let body = self.get_body(url).await?;
        parse_fetched(&body)
    }
}

/// Only absolute http/https URLs are fetched.
fn validate_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url).map_err(|e| ChainError::InvalidUrl(format!("{url}: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(ChainError::InvalidUrl(format!(
            "{url}: unsupported scheme {other}"
        ))),
    }
}

fn map_transport_error(url: &str, err: &reqwest::Error) -> ChainError {
    if err.is_timeout() {
        ChainError::Timeout(url.to_string())
    } else {
        ChainError::Http(err.to_string())
    }
}

/// Builder for configuring an [`HttpFetcher`]
pub struct HttpFetcherBuilder {
    config: FetchConfig,
}

impl HttpFetcherBuilder {
    /// Create a new builder with default settings
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: FetchConfig::default(),
        }
    }

    /// Start from an existing configuration
    #[must_use]
    pub const fn from_config(config: FetchConfig) -> Self {
        Self { config }
    }

    /// Set the per-request timeout
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the User-Agent header
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Set the largest accepted response body
    #[must_use]
    pub const fn max_body_size(mut self, limit: usize) -> Self {
        self.config.max_body_size = limit;
        self
    }

    /// Build the fetcher
    pub fn build(self) -> Result<HttpFetcher> {
        let http = HttpClient::builder()
            .timeout(self.config.timeout)
            .user_agent(&self.config.user_agent)
            .build()
            .map_err(|e| ChainError::Http(format!("failed to build HTTP client: {e}")))?;

        Ok(HttpFetcher {
            inner: Arc::new(FetcherInner {
                http,
                max_body_size: self.config.max_body_size,
            }),
        })
    }
}

impl Default for HttpFetcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}
