//! sreagent - two-phase Azure support agent

use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{chat_command, init_command, patterns_command, status_command, tools_command};

/// sreagent - diagnose and fix Azure application issues from your terminal
#[derive(Parser)]
#[command(name = "sreagent")]
#[command(about = "◆ Two-phase Azure support agent")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config
    Init,
    /// Talk to the support agent
    Chat {
        /// Send one message and exit
        #[arg(short, long)]
        message: Option<String>,
    },
    /// Show configuration status
    Status,
    /// List troubleshooting patterns for a category
    Patterns {
        /// Category, e.g. networking
        category: String,
    },
    /// List the tools each specialization can run
    Tools {
        /// Only this specialization
        category: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Init => {
            if let Err(e) = init_command().await {
                error!("Init failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Commands::Chat { message } => {
            if let Err(e) = chat_command(message).await {
                error!("Error: {:#}", e);
                std::process::exit(1);
            }
        }
        Commands::Status => {
            if let Err(e) = status_command().await {
                error!("Status failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Commands::Patterns { category } => {
            if let Err(e) = patterns_command(category).await {
                error!("Patterns failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Commands::Tools { category } => {
            if let Err(e) = tools_command(category).await {
                error!("Tools failed: {:#}", e);
                std::process::exit(1);
            }
        }
    }
}
