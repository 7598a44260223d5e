mod cli;
mod commands;
mod manifest;

use anyhow::Result;
use asset_config::Config;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing; stdout is reserved for command output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_path(path)?,
        None => Config::load()?,
    };

    match cli.command {
        cli::Commands::Collect { manifest, load } => {
            commands::collect::handle(&manifest, &config, load).await
        }
    }
}
