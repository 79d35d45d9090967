//! Provider endpoints and authentication schemes.

use super::request::{HttpMethod, UpstreamRequest};
use relay_rs_protocol::ToolError;
use reqwest::Url;
use std::fmt;

/// Credential value that never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    /// Wrap a credential value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the raw credential.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret([REDACTED])")
    }
}

/// How a provider expects credentials to be presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    /// `Authorization: Bearer <token>` header.
    Bearer(Secret),
    /// Access key sent as a query-string parameter.
    QueryKey {
        /// Query parameter name, e.g. `access_key`.
        param: String,
        /// Access key value.
        key: Secret,
    },
}

/// Errors raised while configuring an endpoint at startup.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EndpointError {
    /// Base URL did not parse.
    #[error("invalid base url {url}: {message}")]
    InvalidBaseUrl {
        /// Offending URL.
        url: String,
        /// Parser detail.
        message: String,
    },
    /// Base URL cannot carry path segments (e.g. `mailto:`).
    #[error("base url cannot carry a path: {0}")]
    CannotBeABase(String),
}

/// Base URL plus authentication for one provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    base_url: Url,
    auth: Auth,
}

impl Endpoint {
    /// Create an endpoint from a base URL such as `https://api.example.com/v2`.
    pub fn new(base_url: &str, auth: Auth) -> Result<Self, EndpointError> {
        let parsed = Url::parse(base_url).map_err(|err| EndpointError::InvalidBaseUrl {
            url: base_url.to_string(),
            message: err.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(EndpointError::CannotBeABase(base_url.to_string()));
        }
        Ok(Self {
            base_url: parsed,
            auth,
        })
    }

    /// Base URL of the provider.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build an authenticated GET request for path segments under the base URL.
    ///
    /// Each segment is percent-encoded, so ids taken from arguments cannot
    /// alter the path structure.
    pub fn get(&self, segments: &[&str]) -> Result<UpstreamRequest, ToolError> {
        self.request(HttpMethod::Get, segments)
    }

    /// Build an authenticated request for path segments under the base URL.
    pub fn request(
        &self,
        method: HttpMethod,
        segments: &[&str],
    ) -> Result<UpstreamRequest, ToolError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                ToolError::Internal(format!("base url cannot carry a path: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        let request = UpstreamRequest::new(method, url).header("Accept", "application/json");
        Ok(self.authorize(request))
    }

    fn authorize(&self, request: UpstreamRequest) -> UpstreamRequest {
        match &self.auth {
            Auth::Bearer(token) => {
                request.header("Authorization", format!("Bearer {}", token.expose()))
            }
            Auth::QueryKey { param, key } => request.query(param.clone(), key.expose()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Auth, Endpoint, EndpointError, Secret};
    use pretty_assertions::assert_eq;

    #[test]
    fn bearer_auth_sets_header() {
        let endpoint = Endpoint::new(
            "https://api.ancestry.com/v2",
            Auth::Bearer(Secret::new("token-1")),
        )
        .expect("endpoint");
        let request = endpoint.get(&["records", "search"]).expect("request");
        assert_eq!(
            request.url.as_str(),
            "https://api.ancestry.com/v2/records/search"
        );
        assert_eq!(request.header_value("authorization"), Some("Bearer token-1"));
        assert!(request.query.is_empty());
    }

    #[test]
    fn query_key_auth_adds_parameter() {
        let endpoint = Endpoint::new(
            "http://api.marketstack.com/v1/",
            Auth::QueryKey {
                param: "access_key".to_string(),
                key: Secret::new("k-123"),
            },
        )
        .expect("endpoint");
        let request = endpoint.get(&["eod"]).expect("request");
        assert_eq!(request.url.as_str(), "http://api.marketstack.com/v1/eod");
        assert_eq!(request.query_value("access_key"), Some("k-123"));
        assert_eq!(request.header_value("Authorization"), None);
    }

    #[test]
    fn path_segments_are_percent_encoded() {
        let endpoint =
            Endpoint::new("https://api.ancestry.com/v2", Auth::Bearer(Secret::new("t")))
                .expect("endpoint");
        let request = endpoint.get(&["records", "a/b c"]).expect("request");
        assert_eq!(
            request.url.as_str(),
            "https://api.ancestry.com/v2/records/a%2Fb%20c"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = Endpoint::new("not a url", Auth::Bearer(Secret::new("t"))).expect_err("bad");
        assert!(matches!(err, EndpointError::InvalidBaseUrl { .. }));
        let err = Endpoint::new("mailto:ops@example.com", Auth::Bearer(Secret::new("t")))
            .expect_err("not a base");
        assert!(matches!(err, EndpointError::CannotBeABase(_)));
    }

    #[test]
    fn secrets_are_redacted_in_debug() {
        let rendered = format!("{:?}", Secret::new("super-secret"));
        assert!(!rendered.contains("super-secret"));
    }
}
