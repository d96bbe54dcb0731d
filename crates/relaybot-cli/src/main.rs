//! Relaybot CLI — entry point.
//!
//! # Commands
//!
//! - `relaybot run` — start the Telegram bot + relay loop
//! - `relaybot status` — show configuration and provider status
//! - `relaybot onboard` — initialize config
//! - `relaybot auth [--code CODE]` — Google OAuth bootstrap

mod auth;
mod helpers;
mod onboard;
mod run;
mod status;

use anyhow::Result;
use clap::{Parser, Subcommand};

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// Relaybot — Telegram to LLM relay with switchable backends
#[derive(Parser)]
#[command(name = "relaybot", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot (Telegram channel + relay loop)
    Run {
        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Show configuration and provider status
    Status,

    /// Initialize configuration
    Onboard,

    /// Google OAuth bootstrap: print the consent URL, or exchange a code
    /// for a refresh token
    Auth {
        /// Authorization code from the consent redirect
        #[arg(long)]
        code: Option<String>,
    },
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { logs } => {
            init_logging(logs);
            run::run().await
        }
        Commands::Status => status::run(),
        Commands::Onboard => onboard::run(),
        Commands::Auth { code } => {
            init_logging(false);
            auth::run(code).await
        }
    }
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("relaybot=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
