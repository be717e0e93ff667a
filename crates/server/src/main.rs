use clap::Parser;
use tracing_subscriber::EnvFilter;

use kairos_server::app_config::load_config;
use kairos_server::cli::{dispatch, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true)
        .init();

    let cli = Cli::parse();
    let config = load_config();
    dispatch(&config, cli).await
}
