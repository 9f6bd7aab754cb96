//! Binary TCP server for the simulated NSE NNF/NEAT gateway.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use gateway_server::config::Config;
use gateway_server::server;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::parse();
    server::run(config).await
}
