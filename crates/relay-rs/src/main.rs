//! `relay`: serve one provider adapter over line-delimited stdio.

use anyhow::Context;
use clap::Parser;
use log::info;
use relay_rs::{
    build_dispatcher, catalog_listing, http_transport, init_logging, load_config, select_adapter,
};
use relay_rs_config::env_lookup;
use relay_rs_server::StdioServer;
use std::path::PathBuf;
use std::sync::Arc;

/// Command-line options for the relay binary.
#[derive(Parser)]
#[command(name = "relay", version, about)]
struct Cli {
    /// Adapter to serve: ancestry, familysearch, or marketstack
    #[arg(long)]
    adapter: Option<String>,
    /// Optional path to a relay.json5 config file, applied over the default layers
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print the tool catalog as JSON and exit
    #[arg(long)]
    list: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let cli = Cli::parse();
    let cwd = std::env::current_dir().context("failed to resolve current working directory")?;
    let config = load_config(&cwd, cli.config.as_ref())?;
    let adapter = select_adapter(cli.adapter.as_deref(), &config)?;
    info!("starting relay (adapter={})", adapter);

    if cli.list {
        let listing = catalog_listing(&config, adapter)?;
        let rendered =
            serde_json::to_string_pretty(&listing).context("failed to render catalog")?;
        println!("{rendered}");
        return Ok(());
    }

    let transport = http_transport(&config)?;
    let dispatcher = build_dispatcher(&config, adapter, transport, env_lookup)?;
    let server = StdioServer::new(Arc::new(dispatcher), config.server.max_in_flight);
    server.run_stdio().await.context("stdio server failed")?;
    Ok(())
}
