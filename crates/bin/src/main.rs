mod cli;
mod commands;
mod output;
mod store;

use clap::Parser;
use rankboard::RankConfig;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::output::OutputFormat;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("rankboard=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading rank configuration from {}", path.display());
            RankConfig::from_file(path)?
        }
        None => RankConfig::default(),
    };

    match cli.command {
        Commands::Key(command) => commands::key::run(&command, &config, format),
        Commands::Board(args) => commands::board::run(&args, config, format).await,
    }
}
