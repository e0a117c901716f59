//! Cache node server: fronts a store engine with a local read cache and a
//! pool of pre-reserved keys, so most traffic never waits on the store.

use std::path::PathBuf;
use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use clap::Parser;
use tracing::info;

use shortpool::api::node_api;
use shortpool::client::{HttpStoreClient, StoreClient};
use shortpool::config::AppConfig;
use shortpool::services::NodeService;
use shortpool::system::init_logging;

#[derive(Parser, Debug)]
#[command(name = "shortpool-node", about = "Shortpool cache node")]
struct Args {
    /// Configuration file (TOML); defaults to ./shortpool.toml if present
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Override the configured bind host
    #[arg(long)]
    host: Option<String>,
    /// Override the configured bind port
    #[arg(long)]
    port: Option<u16>,
    /// Override the configured store engine base URL
    #[arg(long)]
    store_url: Option<String>,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(store_url) = args.store_url {
        config.node.store_url = store_url;
    }

    let _guard = init_logging(&config.logging);

    let client = HttpStoreClient::new(&config.node.store_url);
    // tolerate startup ordering: an unreachable store is logged, not fatal
    client.ping().await;
    let client: Arc<dyn StoreClient> = Arc::new(client);

    let node = Arc::new(NodeService::new(client, &config.node));
    node.warm_up();
    let node_data = web::Data::new(node);

    info!(
        host = %config.server.host,
        port = config.server.port,
        store_url = %config.node.store_url,
        "starting cache node"
    );

    HttpServer::new(move || {
        App::new()
            .app_data(node_data.clone())
            .configure(node_api::configure)
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await?;

    Ok(())
}
