use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "assets")]
#[command(about = "Collect and order CSS/JS assets", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (default: platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a manifest through the collector and print the collected assets
    Collect {
        /// TOML manifest with one [[asset]] table per asset
        manifest: PathBuf,

        /// Load asset contents before printing
        #[arg(long)]
        load: bool,
    },
}
