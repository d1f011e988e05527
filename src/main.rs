//! Entry point for game-agent, a command-line assistant for video game questions.
//!
//! Loads `.env`, parses arguments via [`cli`], sets up logging on stderr, and
//! runs the session.

mod agent;
mod cli;
mod config;
mod constants;
mod error;
mod knowledge_base;
mod output;
mod provider;
mod session;
mod tools;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = cli::parse();

    let default_level = if cli.verbose { "warn,game_agent=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    cli::run(cli).await
}
