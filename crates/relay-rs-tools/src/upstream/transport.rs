//! HTTP transport seam and the `reqwest` implementation.

use super::request::UpstreamRequest;
use async_trait::async_trait;
use log::debug;
use std::error::Error;
use std::time::Duration;

/// Raw HTTP response before provider-specific classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Canonical reason phrase, when known.
    pub reason: Option<String>,
    /// Response body as text.
    pub body: String,
}

impl RawResponse {
    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Errors raised before a response was received.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Connection, DNS, TLS, or timeout failure.
    #[error("{0}")]
    Request(String),
    /// The response body could not be read.
    #[error("failed to read response body: {0}")]
    Body(String),
    /// The HTTP client could not be constructed.
    #[error("failed to build http client: {0}")]
    Client(String),
}

/// Executes a built request against the network.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send the request and return the raw response.
    async fn execute(&self, request: &UpstreamRequest) -> Result<RawResponse, TransportError>;
}

/// Options for the production HTTP client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpOptions {
    /// Whole-request timeout.
    pub timeout: Duration,
    /// User agent header value.
    pub user_agent: String,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: concat!("relay-rs/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// `reqwest`-backed transport shared by all in-flight calls.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport with the given options.
    pub fn new(options: &HttpOptions) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(options.timeout)
            .user_agent(options.user_agent.clone())
            .build()
            .map_err(|err| TransportError::Client(err.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: &UpstreamRequest) -> Result<RawResponse, TransportError> {
        debug!(
            "sending upstream request (method={}, url={})",
            request.method, request.url
        );
        let mut builder = self
            .client
            .request(request.method.as_reqwest(), request.full_url());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder
            .send()
            .await
            .map_err(|err| TransportError::Request(describe(err)))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| TransportError::Body(describe(err)))?;
        debug!(
            "upstream responded (status={}, body_len={})",
            status.as_u16(),
            body.len()
        );
        Ok(RawResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().map(str::to_string),
            body,
        })
    }
}

/// Render a `reqwest` error with its full cause chain.
///
/// The URL is stripped first: it can carry an access key.
fn describe(err: reqwest::Error) -> String {
    let err = err.without_url();
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
