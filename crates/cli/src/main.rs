//! Palaver CLI — the main entry point.
//!
//! Commands:
//! - `serve`    — Start the HTTP server with the chat dashboard
//! - `chat`     — Terminal chat, interactive or single-message
//! - `personas` — List conversation styles
//! - `models`   — List selectable models
//! - `config`   — Print a default config file
//! - `doctor`   — Diagnose configuration and connectivity

use clap::{Parser, Subcommand};
use palaver_core::{ChatModel, Persona};

mod commands;

#[derive(Parser)]
#[command(
    name = "palaver",
    about = "Palaver — persona-driven chat with bounded conversation memory",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server and chat dashboard
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,

        /// Override the bind address
        #[arg(long)]
        host: Option<String>,
    },

    /// Chat in the terminal
    Chat {
        /// Conversation style (Default, Expert, Creative)
        #[arg(short, long)]
        persona: Option<Persona>,

        /// Number of past exchanges replayed to the model (1-10)
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..=10))]
        memory: Option<u64>,

        /// Model id
        #[arg(long)]
        model: Option<ChatModel>,

        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,
    },

    /// List available personas
    Personas,

    /// List available models
    Models,

    /// Print a default configuration file
    Config,

    /// Diagnose configuration and model connectivity
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env must be loaded before RUST_LOG and the token are read.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize tracing; interactive commands stay quiet unless asked.
    let filter = match (&cli.command, cli.verbose) {
        (_, true) => "debug",
        (Commands::Serve { .. }, false) => "info",
        (_, false) => "warn",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Serve { port, host } => commands::serve::run(port, host).await?,
        Commands::Chat {
            persona,
            memory,
            model,
            message,
        } => {
            let args = commands::chat::ChatArgs {
                persona,
                memory_turns: memory.map(|m| m as usize),
                model,
                message,
            };
            commands::chat::run(args).await?
        }
        Commands::Personas => commands::personas::run(),
        Commands::Models => commands::models::run().await,
        Commands::Config => commands::config_cmd::run(),
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
