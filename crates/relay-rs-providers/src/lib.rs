//! Provider adapters: tool catalogs, request builders and auth schemes.

pub mod ancestry;
pub mod familysearch;
pub mod marketstack;
pub mod tool;

use log::info;
use relay_rs_tools::{
    Auth, CatalogError, Endpoint, EndpointError, ErrorShape, HttpTransport, Secret, ToolCatalog,
    UpstreamClient,
};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Provider tool type.
pub use tool::{BuildFn, ProviderTool};

/// Errors raised while assembling an adapter at startup.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    /// Adapter name is not recognized.
    #[error("unknown adapter `{0}` (expected one of: ancestry, familysearch, marketstack)")]
    UnknownAdapter(String),
    /// Endpoint configuration is invalid.
    #[error(transparent)]
    Endpoint(#[from] EndpointError),
    /// Catalog assembly failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// The provider an adapter process relays to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Adapter {
    /// Ancestry historical records and trees.
    Ancestry,
    /// FamilySearch tree graph.
    FamilySearch,
    /// Marketstack market data.
    Marketstack,
}

impl Adapter {
    /// Every adapter, in listing order.
    pub const ALL: [Adapter; 3] = [Self::Ancestry, Self::FamilySearch, Self::Marketstack];

    /// Stable lowercase name used in config and on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Self::Ancestry => "ancestry",
            Self::FamilySearch => "familysearch",
            Self::Marketstack => "marketstack",
        }
    }

    /// Base URL used when config does not override it.
    pub fn default_base_url(self) -> &'static str {
        match self {
            Self::Ancestry => ancestry::DEFAULT_BASE_URL,
            Self::FamilySearch => familysearch::DEFAULT_BASE_URL,
            Self::Marketstack => marketstack::DEFAULT_BASE_URL,
        }
    }

    /// Error shapes the provider embeds in response bodies.
    pub fn error_shapes(self) -> &'static [ErrorShape] {
        match self {
            Self::Ancestry => ancestry::ERROR_SHAPES,
            Self::FamilySearch => familysearch::ERROR_SHAPES,
            Self::Marketstack => marketstack::ERROR_SHAPES,
        }
    }

    /// How the provider expects the key to be presented.
    pub fn auth(self, credentials: &AdapterCredentials) -> Auth {
        match self {
            Self::Ancestry | Self::FamilySearch => Auth::Bearer(credentials.api_key.clone()),
            Self::Marketstack => Auth::QueryKey {
                param: marketstack::ACCESS_KEY_PARAM.to_string(),
                key: credentials.api_key.clone(),
            },
        }
    }

    /// Authenticated endpoint for this provider.
    pub fn endpoint(
        self,
        base_url: Option<&str>,
        credentials: &AdapterCredentials,
    ) -> Result<Endpoint, AdapterError> {
        let base_url = base_url.unwrap_or(self.default_base_url());
        Ok(Endpoint::new(base_url, self.auth(credentials))?)
    }

    /// Tool catalog bound to an endpoint.
    pub fn catalog(self, endpoint: Arc<Endpoint>) -> Result<ToolCatalog, AdapterError> {
        let catalog = match self {
            Self::Ancestry => ancestry::catalog(endpoint)?,
            Self::FamilySearch => familysearch::catalog(endpoint)?,
            Self::Marketstack => marketstack::catalog(endpoint)?,
        };
        Ok(catalog)
    }

    /// Catalog plus the upstream client recognizing this provider's error shapes.
    pub fn assemble(
        self,
        base_url: Option<&str>,
        credentials: &AdapterCredentials,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<(ToolCatalog, UpstreamClient), AdapterError> {
        let endpoint = Arc::new(self.endpoint(base_url, credentials)?);
        let catalog = self.catalog(endpoint.clone())?;
        info!(
            "adapter assembled (adapter={}, base_url={}, tools={})",
            self,
            endpoint.base_url(),
            catalog.len()
        );
        Ok((catalog, UpstreamClient::new(transport, self.error_shapes())))
    }
}

impl fmt::Display for Adapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Adapter {
    type Err = AdapterError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|adapter| adapter.name().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| AdapterError::UnknownAdapter(value.to_string()))
    }
}

/// Credentials injected into an adapter at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterCredentials {
    /// API key or access token.
    pub api_key: Secret,
    /// Secondary secret, required by Ancestry.
    pub api_secret: Option<Secret>,
}

impl AdapterCredentials {
    /// Credentials with only a key.
    pub fn key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key),
            api_secret: None,
        }
    }

    /// Attach a secondary secret.
    pub fn with_secret(mut self, api_secret: impl Into<String>) -> Self {
        self.api_secret = Some(Secret::new(api_secret));
        self
    }
}
