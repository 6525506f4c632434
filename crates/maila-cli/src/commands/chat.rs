//! `maila chat` -- talk to maila.
//!
//! Without `--message` this runs a line-oriented conversation on the
//! terminal until `/exit` or end of input. With `--message` it answers
//! one message and exits, which is mostly useful for smoke-testing a
//! config.
//!
//! # Examples
//!
//! ```text
//! maila chat
//! maila chat -m "what can you do?"
//! maila chat -c ~/maila.json
//! ```

use std::io::Write;
use std::sync::Arc;

use clap::Args;
use tokio::io::AsyncBufReadExt;
use tracing::info;

use maila_core::{Orchestrator, SideEffect, TurnOutput};
use maila_mail::GuerrillaTransport;
use maila_platform::NativePlatform;
use maila_platform::fs::NativeFileSystem;
use maila_types::task::{EmailStateKind, TaskState};

use super::load_config;
use crate::view::render_message;

/// Arguments for the `maila chat` subcommand.
#[derive(Args)]
pub struct ChatArgs {
    /// Send a single message and exit (non-interactive mode).
    #[arg(short, long)]
    pub message: Option<String>,

    /// Config file path (overrides auto-discovery).
    #[arg(short, long)]
    pub config: Option<String>,
}

/// Run the chat command.
pub async fn run(args: ChatArgs) -> anyhow::Result<()> {
    let platform = NativePlatform::new();
    let config = load_config(&platform, args.config.as_deref()).await?;

    let transport = GuerrillaTransport::new(&config.mail)?;
    info!(api = transport.api_url(), "mail transport ready");

    let mut bot = Orchestrator::new(&config, Arc::new(transport), Arc::new(NativeFileSystem));

    match args.message {
        Some(message) => {
            let out = bot.respond(&message).await;
            print_turn(&out);
        }
        None => run_interactive(&mut bot).await?,
    }

    Ok(())
}

async fn run_interactive(bot: &mut Orchestrator) -> anyhow::Result<()> {
    println!("{}", bot.greeting());
    println!("(type /exit to leave)");
    println!();

    let stdin = tokio::io::stdin();
    let mut reader = tokio::io::BufReader::new(stdin).lines();

    loop {
        eprint!("{}", prompt(bot.state()));
        std::io::stderr().flush().ok();

        let Some(line) = reader.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if matches!(input, "/exit" | "/quit") {
            break;
        }

        let out = bot.respond(input).await;
        print_turn(&out);
        println!();
    }

    if let Some(session) = bot.session() {
        // The inbox outlives the process; the id is all that's needed to
        // come back to it.
        println!(
            "Your inbox {} stays available. Restore it later with session ID {}.",
            session.address, session.sid_token
        );
    }
    Ok(())
}

/// Input prompt, hinting when an email task is open.
fn prompt(state: TaskState) -> &'static str {
    match state.email_kind() {
        Some(EmailStateKind::Loop) => "inbox> ",
        Some(EmailStateKind::Awaiting) => "inbox?> ",
        None => "> ",
    }
}

fn print_turn(out: &TurnOutput) {
    println!("{}", out.text);
    if let Some(SideEffect::ViewEmail(message)) = &out.effect {
        println!("{}", render_message(message));
    }
}
