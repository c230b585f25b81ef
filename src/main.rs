use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sandboxer::config::Config;

mod commands;

#[derive(Parser)]
#[command(name = "sandboxer")]
#[command(
    author,
    version,
    about = "Get-or-start provisioning of remote sandboxes for project tools"
)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ./sandboxer.toml, then the user config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a project's sandbox, starting it if stopped or archived
    Ensure {
        /// Project id to look up in the project store
        project_id: String,
    },

    /// Get a sandbox by id, starting it if stopped or archived
    Start {
        /// Provider sandbox id
        sandbox_id: String,
    },

    /// Create a new sandbox and launch its supervisor
    Create {
        /// VNC password (a random one is generated if omitted)
        #[arg(short, long)]
        password: Option<String>,

        /// Value for the sandbox's `id` label
        #[arg(short, long)]
        label: Option<String>,
    },

    /// Print the preview URL for a sandbox port
    Preview {
        /// Provider sandbox id
        sandbox_id: String,

        /// Port exposed by the sandbox
        #[arg(default_value = "8080")]
        port: u16,
    },

    /// Show the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("sandboxer=debug")
    } else {
        EnvFilter::new("sandboxer=info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let config = Config::load(&cwd, cli.config.as_deref())?;

    match cli.command {
        Commands::Ensure { project_id } => {
            commands::ensure::run(&config, &project_id).await?;
        }
        Commands::Start { sandbox_id } => {
            commands::start::run(&config, &sandbox_id).await?;
        }
        Commands::Create { password, label } => {
            commands::create::run(&config, password, label).await?;
        }
        Commands::Preview { sandbox_id, port } => {
            commands::preview::run(&config, &sandbox_id, port).await?;
        }
        Commands::Config => {
            commands::config::run(&config)?;
        }
    }

    Ok(())
}
