//! HTTP page fetching.
//!
//! Every request made by the harvester goes through the [`PageSource`] trait.
//! [`PageFetcher`] is the real implementation backed by `reqwest`; tests swap
//! in fakes to observe which URLs get requested.
//!
//! # Fetch Policy
//!
//! - `User-Agent: Mozilla/5.0`
//! - 10 second timeout per request
//! - TLS certificate verification **disabled** unless `--verify-tls` is given.
//!   The target site is reached through hosts with invalid certificates, so
//!   this default is kept on purpose and logged at startup.

use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

/// Default `User-Agent` header sent with every request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// A failed page fetch. Every variant carries the URL that failed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid url {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: StatusCode },

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    /// The URL whose fetch failed.
    pub fn url(&self) -> &str {
        match self {
            FetchError::InvalidUrl { url, .. }
            | FetchError::Timeout { url }
            | FetchError::Status { url, .. }
            | FetchError::Request { url, .. } => url,
        }
    }

    fn from_reqwest(url: &str, e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else if let Some(status) = e.status() {
            FetchError::Status {
                url: url.to_string(),
                status,
            }
        } else {
            FetchError::Request {
                url: url.to_string(),
                source: e,
            }
        }
    }
}

/// Something that can turn a URL into raw HTML.
pub trait PageSource {
    /// Fetch `url` and return the response body.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Request settings applied to every fetch.
#[derive(Debug, Clone)]
pub struct FetchPolicy {
    pub user_agent: String,
    pub timeout: Duration,
    /// Accept self-signed or otherwise invalid TLS certificates.
    pub accept_invalid_certs: bool,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            accept_invalid_certs: true,
        }
    }
}

/// `reqwest`-backed [`PageSource`].
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    /// Build a fetcher whose client enforces `policy` on every request.
    pub fn new(policy: &FetchPolicy) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(policy.user_agent.as_str())
            .timeout(policy.timeout)
            .danger_accept_invalid_certs(policy.accept_invalid_certs)
            .build()?;
        Ok(Self { client })
    }
}

impl PageSource for PageFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let parsed = Url::parse(url).map_err(|source| FetchError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;
        debug!(bytes = body.len(), %status, "Fetched page");
        Ok(body)
    }
}
