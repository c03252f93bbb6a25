use std::net::SocketAddr;
use std::sync::Arc;
use dotenv::dotenv;
use log::info;
use warp::Filter;

use treasury_yields::config::ServiceConfig;
use treasury_yields::routes;
use treasury_yields::services::cache::YieldCache;
use treasury_yields::services::treasury::TreasuryClient;
use treasury_yields::services::yields::YieldsService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    // Initialize the logger
    env_logger::init();
    info!("Logger initialized. Starting the application...");

    let config = ServiceConfig::from_env()?;

    // Bind to 0.0.0.0 so the service is reachable from outside a container
    let addr: SocketAddr = ([0, 0, 0, 0], config.port).into();
    info!("Will bind to: {}", addr);

    let client = TreasuryClient::from_config(&config)?;
    let cache = YieldCache::new(config.cache_max_entries);
    let service = Arc::new(YieldsService::new(client, cache));

    // Set up CORS
    let cors = match &config.cors_origin {
        Some(origin) => warp::cors().allow_origin(origin.as_str()),
        None => warp::cors().allow_any_origin(),
    }
    .allow_header("content-type")
    .allow_methods(vec!["GET", "OPTIONS"]);

    let api = routes::routes(service).with(cors);
    info!("Routes configured successfully with CORS.");

    info!("Starting server on {}", addr);
    warp::serve(api).run(addr).await;
    Ok(())
}
