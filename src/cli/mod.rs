pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "jobreq")]
#[command(about = "jobreq - relay job deletion requests to an automation server")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Delete a job, remotely or in a local jobs directory")]
    Delete(commands::delete::DeleteArgs),

    #[command(about = "Automation server profile management")]
    Server {
        #[command(subcommand)]
        cmd: commands::server::ServerCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Run a parsed command; `Ok(false)` means it completed but reported a failure
pub async fn run(cli: Cli) -> anyhow::Result<bool> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Delete(args) => commands::delete::handle(args, output_format).await,
        Commands::Server { cmd } => commands::server::handle(cmd, output_format).await,
    }
}
