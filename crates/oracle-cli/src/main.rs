use anyhow::Result;
use clap::{Parser, Subcommand};
use oracle_application::ConfigService;
use std::path::PathBuf;

mod commands;
mod diagnostics;

#[derive(Parser)]
#[command(name = "oracle")]
#[command(about = "Oracle - constraint interrogation and decision map exploration", long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the user config directory
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a JSON-lines script of UI intents and agent pushes
    Replay {
        /// Script path; one step per line
        script: PathBuf,
    },
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let diagnostics = diagnostics::init();

    let config_service = match cli.config {
        Some(path) => ConfigService::with_path(path),
        None => ConfigService::new()?,
    };

    match cli.command {
        Commands::Replay { script } => {
            commands::replay::run(&script, &config_service, diagnostics).await?
        }
        Commands::Config => commands::config::show(&config_service)?,
    }

    Ok(())
}
