//! Outbound request model.

use relay_rs_protocol::ToolError;
use reqwest::Url;
use std::fmt;

/// HTTP methods used by provider builders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// GET.
    Get,
}

impl HttpMethod {
    /// Equivalent `reqwest` method.
    pub fn as_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Get => "GET",
        })
    }
}

/// Fully formed outbound request, derived from validated arguments.
#[derive(Clone, PartialEq)]
pub struct UpstreamRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Target URL without query string.
    pub url: Url,
    /// Headers in insertion order.
    pub headers: Vec<(String, String)>,
    /// Query parameters in insertion order.
    pub query: Vec<(String, String)>,
}

impl UpstreamRequest {
    /// Create a request with no headers or query.
    pub fn new(method: HttpMethod, url: Url) -> Self {
        Self {
            method,
            url,
            headers: Vec::new(),
            query: Vec::new(),
        }
    }

    /// Create a request from a URL string.
    pub fn parse(method: HttpMethod, url: &str) -> Result<Self, ToolError> {
        let url = Url::parse(url)
            .map_err(|err| ToolError::Internal(format!("invalid url {url}: {err}")))?;
        Ok(Self::new(method, url))
    }

    /// Append a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Append a query parameter.
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Append a query parameter only when a value is present.
    pub fn query_opt(self, name: impl Into<String>, value: Option<String>) -> Self {
        match value {
            Some(value) => self.query(name, value),
            None => self,
        }
    }

    /// URL including the encoded query string.
    pub fn full_url(&self) -> Url {
        let mut url = self.url.clone();
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(self.query.iter());
        }
        url
    }

    /// First query value for a parameter name.
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// First header value, matched case-insensitively.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Credentials may travel in headers or query values, so only names are shown.
impl fmt::Debug for UpstreamRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamRequest")
            .field("method", &self.method)
            .field("url", &self.url.as_str())
            .field(
                "headers",
                &self.headers.iter().map(|(key, _)| key).collect::<Vec<_>>(),
            )
            .field(
                "query",
                &self.query.iter().map(|(key, _)| key).collect::<Vec<_>>(),
            )
            .finish()
    }
}
