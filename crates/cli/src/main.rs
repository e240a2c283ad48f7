//! twilink CLI
//!
//! Runs Twilio components one at a time or chained together in a flow file.

mod commands;
mod config;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};
use twilink_component::ComponentRegistry;

use crate::config::{FileConfig, LayeredEnv};

/// twilink CLI: run Twilio workflow components from the terminal.
#[derive(Parser, Debug)]
#[command(name = "twilink", version, about)]
struct Cli {
    /// TOML file whose `[twilio]` table fills in unset TWILIO_* variables.
    #[arg(long, env = "TWILINK_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Output format.
    #[arg(long, default_value = "text", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List available components and their ports.
    Components(commands::components::ComponentsArgs),
    /// Run a single component.
    Run(commands::run::RunArgs),
    /// Run a flow file.
    Flow(commands::flow::FlowArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let file_config = match &cli.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let env = LayeredEnv::new(file_config.twilio.into_vars());

    let mut registry = ComponentRegistry::new();
    twilink_twilio::register_all(&mut registry, Arc::new(env));

    match cli.command {
        Command::Components(args) => commands::components::run(&registry, &args, &cli.format),
        Command::Run(args) => commands::run::run(&registry, &args, &cli.format).await,
        Command::Flow(args) => commands::flow::run(&registry, &args, &cli.format).await,
    }
}
