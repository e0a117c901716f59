//! Store engine server: owns the durable key table and serves the
//! shorten/query/reserve/setReserve API that cache nodes build on.

use std::path::PathBuf;

use actix_web::{App, HttpServer, web};
use clap::Parser;
use tracing::info;

use shortpool::api::store_api;
use shortpool::config::AppConfig;
use shortpool::storage::{KEYSPACE_SIZE, UrlStore};
use shortpool::system::init_logging;

#[derive(Parser, Debug)]
#[command(name = "shortpool-store", about = "Shortpool durable store engine")]
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

    let _guard = init_logging(&config.logging);

    let store = UrlStore::open_with_limits(
        &config.store.db_path,
        KEYSPACE_SIZE,
        config.store.probe_budget,
    )?;
    let store_data = web::Data::new(store);

    info!(
        host = %config.server.host,
        port = config.server.port,
        db_path = %config.store.db_path,
        "starting store engine"
    );

    HttpServer::new(move || {
        App::new()
            .app_data(store_data.clone())
            .configure(store_api::configure)
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await?;

    Ok(())
}
