//! Bootstrap for the `relay` binary: config loading, adapter selection, and
//! dispatcher assembly.

use anyhow::{Context, bail};
use log::{debug, info};
use relay_rs_config::{LayeredConfigOptions, RelayConfig, resolve_credentials};
use relay_rs_protocol::ToolListing;
use relay_rs_providers::{Adapter, AdapterCredentials};
use relay_rs_tools::{Dispatcher, HttpOptions, HttpTransport, ReqwestTransport};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Initialize stderr logging; `RUST_LOG` controls the filter.
pub fn init_logging() {
    let _ = env_logger::builder()
        .format_timestamp_millis()
        .parse_default_env()
        .try_init();
}

/// Load the layered config, with `explicit` applied as a runtime override.
pub fn load_config(cwd: &Path, explicit: Option<&PathBuf>) -> anyhow::Result<RelayConfig> {
    let mut options = LayeredConfigOptions::new(cwd);
    if let Some(path) = explicit {
        options = options.with_runtime_path(path);
    }
    let layered =
        RelayConfig::load_layered_with_options(options).context("failed to load config")?;
    debug!("config loaded (layers={})", layered.layers.len());
    Ok(layered.config)
}

/// Pick the adapter: command line first, then config.
pub fn select_adapter(requested: Option<&str>, config: &RelayConfig) -> anyhow::Result<Adapter> {
    if let Some(name) = requested {
        return name
            .parse::<Adapter>()
            .with_context(|| format!("invalid --adapter value `{name}`"));
    }
    match config.default_adapter() {
        Some(adapter) => Ok(adapter),
        None => bail!("no adapter selected; pass --adapter or set `adapter` in relay.json5"),
    }
}

/// Production HTTP transport built from config.
pub fn http_transport(config: &RelayConfig) -> anyhow::Result<Arc<dyn HttpTransport>> {
    let mut options = HttpOptions {
        timeout: config.http.timeout(),
        ..HttpOptions::default()
    };
    if let Some(user_agent) = &config.http.user_agent {
        options.user_agent = user_agent.clone();
    }
    let transport = ReqwestTransport::new(&options).context("failed to build http client")?;
    Ok(Arc::new(transport))
}

/// Assemble the dispatcher for an adapter.
///
/// Credentials are resolved through `lookup`; a missing one is fatal.
pub fn build_dispatcher(
    config: &RelayConfig,
    adapter: Adapter,
    transport: Arc<dyn HttpTransport>,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Dispatcher> {
    let credentials = resolve_credentials(config, adapter, lookup)
        .with_context(|| format!("cannot start {adapter} adapter"))?;
    let base_url = config.providers.get(adapter).base_url.as_deref();
    let (catalog, client) = adapter
        .assemble(base_url, &credentials, transport)
        .with_context(|| format!("failed to assemble {adapter} adapter"))?;
    info!(
        "dispatcher ready (adapter={}, tools={})",
        adapter,
        catalog.len()
    );
    Ok(Dispatcher::new(Arc::new(catalog), client))
}

/// Catalog listing for an adapter; needs no credentials since nothing is sent.
pub fn catalog_listing(config: &RelayConfig, adapter: Adapter) -> anyhow::Result<ToolListing> {
    let base_url = config.providers.get(adapter).base_url.as_deref();
    let endpoint = adapter
        .endpoint(base_url, &AdapterCredentials::key(""))
        .context("invalid provider endpoint")?;
    let catalog = adapter
        .catalog(Arc::new(endpoint))
        .context("failed to build catalog")?;
    Ok(catalog.listing())
}

#[cfg(test)]
mod tests {
    use super::{build_dispatcher, catalog_listing, load_config, select_adapter};
    use pretty_assertions::assert_eq;
    use relay_rs_config::RelayConfig;
    use relay_rs_providers::Adapter;
    use relay_rs_test_utils::StubTransport;
    use relay_rs_tools::InvocationRequest;
    use serde_json::json;
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn command_line_adapter_wins_over_config() {
        let config = RelayConfig::load_from_str(r#"{ adapter: "ancestry" }"#).expect("config");
        assert_eq!(
            select_adapter(Some("marketstack"), &config).expect("adapter"),
            Adapter::Marketstack
        );
        assert_eq!(select_adapter(None, &config).expect("adapter"), Adapter::Ancestry);
        assert!(select_adapter(None, &RelayConfig::default()).is_err());
        assert!(select_adapter(Some("github"), &config).is_err());
    }

    #[test]
    fn explicit_config_path_overrides_cwd() {
        let temp = TempDir::new().expect("tmp");
        fs::write(temp.path().join("relay.json5"), r#"{ adapter: "ancestry" }"#).expect("write");
        let explicit = temp.path().join("other.json5");
        fs::write(&explicit, r#"{ adapter: "familysearch" }"#).expect("write");

        let config = load_config(temp.path(), Some(&explicit)).expect("config");
        assert_eq!(config.default_adapter(), Some(Adapter::FamilySearch));
    }

    #[test]
    fn missing_credentials_are_fatal() {
        let err = build_dispatcher(
            &RelayConfig::default(),
            Adapter::Marketstack,
            Arc::new(StubTransport::new()),
            |_: &str| None,
        )
        .expect_err("missing key");
        let message = format!("{err:#}");
        assert!(message.contains("cannot start marketstack adapter"));
        assert!(message.contains("MARKETSTACK_API_KEY"));
    }

    #[tokio::test]
    async fn configured_base_url_reaches_requests() {
        let config = RelayConfig::load_from_str(
            r#"{ providers: { marketstack: { base_url: "https://mirror.example.com/v1" } } }"#,
        )
        .expect("config");
        let transport = StubTransport::with_json(200, json!({ "data": [] }));
        let dispatcher = build_dispatcher(
            &config,
            Adapter::Marketstack,
            Arc::new(transport.clone()),
            |name: &str| (name == "MARKETSTACK_API_KEY").then(|| "ms-key".to_string()),
        )
        .expect("dispatcher");

        let envelope = dispatcher
            .dispatch(InvocationRequest::new("marketstack_exchanges", json!({})))
            .await;
        assert!(!envelope.is_error);
        assert_eq!(
            transport.requests()[0].full_url().as_str(),
            "https://mirror.example.com/v1/exchanges?access_key=ms-key&limit=100"
        );
    }

    #[test]
    fn listing_needs_no_credentials() {
        let listing = catalog_listing(&RelayConfig::default(), Adapter::FamilySearch)
            .expect("listing");
        let names = listing
            .tools
            .iter()
            .map(|tool| tool.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(
            names,
            vec![
                "familysearch_get_person",
                "familysearch_get_ancestry",
                "familysearch_get_descendancy",
                "familysearch_search_persons"
            ]
        );
    }
}
