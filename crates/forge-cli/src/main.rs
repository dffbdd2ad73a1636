use anyhow::Result;
use clap::{Parser, Subcommand};
use forge_core::config::ForgeConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "forge")]
#[command(about = "PromptForge - System instruction architect backed by Gemini", long_about = None)]
struct Cli {
    /// Path to config.toml (default: ~/.config/promptforge/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the built-in project templates
    Templates {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the constraint catalog with its default states
    Constraints {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate a system instruction for a project
    Generate(commands::generate::GenerateArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Templates { json } => commands::list::templates(json)?,
        Commands::Constraints { json } => commands::list::constraints(json)?,
        Commands::Generate(args) => {
            let settings = ForgeConfig::load_or_default(cli.config.as_deref())?;
            commands::generate::run(args, &settings).await?
        }
    }

    Ok(())
}
