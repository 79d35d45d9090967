//! Configuration schema for relay.

use relay_rs_providers::Adapter;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root config for the relay binary.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RelayConfig {
    #[serde(default, rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    /// Adapter served when the command line does not name one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adapter: Option<String>,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

impl RelayConfig {
    /// Default adapter named in config, parsed.
    pub fn default_adapter(&self) -> Option<Adapter> {
        self.adapter
            .as_deref()
            .and_then(|name| name.parse::<Adapter>().ok())
    }
}

/// Outbound HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HttpConfig {
    /// Whole-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// User agent override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl HttpConfig {
    /// Request timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: None,
        }
    }
}

/// Stdio server settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// Maximum tool calls processed concurrently.
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            max_in_flight: default_max_in_flight(),
        }
    }
}

/// Per-provider settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub ancestry: ProviderConfig,
    #[serde(default)]
    pub familysearch: ProviderConfig,
    #[serde(default)]
    pub marketstack: ProviderConfig,
}

impl ProvidersConfig {
    /// Settings for one adapter.
    pub fn get(&self, adapter: Adapter) -> &ProviderConfig {
        match adapter {
            Adapter::Ancestry => &self.ancestry,
            Adapter::FamilySearch => &self.familysearch,
            Adapter::Marketstack => &self.marketstack,
        }
    }
}

/// Endpoint and credential sources for one provider.
///
/// Unset environment variable names fall back to the adapter defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ProviderConfig {
    /// Base URL override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Environment variable holding the API key or token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
    /// Environment variable holding the secondary secret.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_secret_env: Option<String>,
}

impl ProviderConfig {
    /// Environment variable for the key, falling back to the adapter default.
    pub fn key_env(&self, adapter: Adapter) -> &str {
        self.api_key_env
            .as_deref()
            .unwrap_or_else(|| default_key_env(adapter))
    }

    /// Environment variable for the secondary secret, when one applies.
    pub fn secret_env(&self, adapter: Adapter) -> Option<&str> {
        self.api_secret_env
            .as_deref()
            .or_else(|| default_secret_env(adapter))
    }
}

/// Default environment variable holding an adapter's key.
pub fn default_key_env(adapter: Adapter) -> &'static str {
    match adapter {
        Adapter::Ancestry => "ANCESTRY_API_KEY",
        Adapter::FamilySearch => "FAMILYSEARCH_ACCESS_TOKEN",
        Adapter::Marketstack => "MARKETSTACK_API_KEY",
    }
}

/// Default environment variable holding an adapter's secondary secret.
pub fn default_secret_env(adapter: Adapter) -> Option<&'static str> {
    match adapter {
        Adapter::Ancestry => Some("ANCESTRY_API_SECRET"),
        Adapter::FamilySearch | Adapter::Marketstack => None,
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_in_flight() -> usize {
    32
}
