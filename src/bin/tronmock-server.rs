#![forbid(unsafe_code)]
//! Mock responder server: loads the fabricated transaction table and serves
//! both spoofed API families on one port.

use clap::Parser;
use std::sync::Arc;
use tronmock::api::{run_server, AppState};
use tronmock::config::load_config;
use tronmock::responses::Defaults;
use tronmock::store::RecordStore;

#[derive(Parser)]
#[command(
    name = "tronmock-server",
    about = "Mock Tron explorer and wallet-RPC responder"
)]
struct Args {
    /// Override the API port from config.toml
    #[arg(long)]
    port: Option<u16>,

    /// Override the record table path from config.toml
    #[arg(long)]
    data: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let config = load_config()?;
    let port = args.port.unwrap_or(config.network.api_port);
    let path = args.data.unwrap_or(config.store.path);

    let store = Arc::new(RecordStore::new(path));
    let entries = store.load();
    tracing::info!(entries, "record store ready");

    let state = AppState {
        store,
        defaults: Defaults {
            sentinel_block: config.responder.sentinel_block,
        },
    };

    run_server(state, port).await
}
