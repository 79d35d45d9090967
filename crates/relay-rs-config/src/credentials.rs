//! Startup credential resolution.

use crate::{ConfigError, RelayConfig};
use log::debug;
use relay_rs_providers::{Adapter, AdapterCredentials};

/// Look up a variable in the process environment.
pub fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Resolve the credentials an adapter needs, failing when any is unset or empty.
///
/// `lookup` maps an environment variable name to its value; pass
/// [`env_lookup`] in production.
pub fn resolve_credentials(
    config: &RelayConfig,
    adapter: Adapter,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<AdapterCredentials, ConfigError> {
    let provider = config.providers.get(adapter);
    let read = |variable: &str| {
        lookup(variable)
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingCredential {
                adapter: adapter.name().to_string(),
                variable: variable.to_string(),
            })
    };

    let key_env = provider.key_env(adapter);
    let mut credentials = AdapterCredentials::key(read(key_env)?);
    if let Some(secret_env) = provider.secret_env(adapter) {
        credentials = credentials.with_secret(read(secret_env)?);
    }
    debug!(
        "credentials resolved (adapter={}, key_env={}, has_secret={})",
        adapter,
        key_env,
        credentials.api_secret.is_some()
    );
    Ok(credentials)
}
