//! `maila` -- CLI binary for the maila disposable-email chatbot.
//!
//! Provides the following subcommands:
//!
//! - `maila chat` -- Start a conversation or send a single message.
//! - `maila config show` -- Print the resolved configuration.

use clap::{Parser, Subcommand};

mod commands;
mod view;

/// maila disposable-email chatbot.
#[derive(Parser)]
#[command(name = "maila", about = "Conversational disposable-email assistant", version)]
struct Cli {
    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Chat with maila interactively, or send a single message.
    Chat(commands::chat::ChatArgs),

    /// Inspect configuration.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the resolved configuration as JSON.
    Show {
        /// Config file path (overrides auto-discovery).
        #[arg(short, long)]
        config: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr and stay quiet by default so they don't interleave
    // with the conversation.
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    match cli.command {
        Commands::Chat(args) => commands::chat::run(args).await?,
        Commands::Config { action } => {
            let platform = maila_platform::NativePlatform::new();
            match action {
                ConfigAction::Show { config } => {
                    let cfg = commands::load_config(&platform, config.as_deref()).await?;
                    commands::config_cmd::config_show(&cfg)?;
                }
            }
        }
    }

    Ok(())
}
