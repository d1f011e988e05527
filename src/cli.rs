//! Command-line interface and startup wiring.
//!
//! Parses flags with [`clap`], loads config, fixes the session's knowledge
//! base id, assembles the agent, and hands control to the [`Session`].

use std::io;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use crate::agent::GameAgent;
use crate::config::Config;
use crate::constants::{HISTORY_FILENAME, KNOWLEDGE_BASE_ENV};
use crate::knowledge_base::BedrockKnowledgeBase;
use crate::provider::{self, Provider};
use crate::session::input::ConsoleSource;
use crate::session::{preset_knowledge_base_id, Mode, Session};
use crate::tools::game_info::StaticCatalog;
use crate::tools::ToolRegistry;

/// Answers questions about video games using a knowledge base and the web.
///
/// With a QUERY, answers it once and exits; without one, starts an
/// interactive session.
#[derive(Parser, Debug)]
#[command(name = "game-agent", version, about)]
pub struct Cli {
    /// Question to answer in batch mode
    #[arg(trailing_var_arg = true)]
    pub query: Vec<String>,

    /// Knowledge base id (overrides KNOWLEDGE_BASE_ID and config)
    #[arg(long = "kb-id", value_name = "ID")]
    pub kb_id: Option<String>,

    /// Provider to use (anthropic, openai, openrouter, ollama)
    #[arg(short, long)]
    pub provider: Option<String>,

    /// Model to use (overrides config; accepts provider/model)
    #[arg(short, long)]
    pub model: Option<String>,

    /// AWS region of the knowledge base
    #[arg(long)]
    pub region: Option<String>,

    /// Log debug output to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// Parses command-line arguments into a [`Cli`] struct.
///
/// Delegates to [`clap::Parser::parse`], which exits the process on invalid input.
pub fn parse() -> Cli {
    Cli::parse()
}

pub async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    let selection = provider::resolve_model(cli.provider.as_deref(), cli.model.as_deref(), &config)?;

    let history_path = Config::cache_dir()
        .ok()
        .map(|dir| dir.join(HISTORY_FILENAME));
    let mut session = Session::new(ConsoleSource::open(history_path), io::stdout());

    let env_kb_id = std::env::var(KNOWLEDGE_BASE_ENV).ok();
    let preset = preset_knowledge_base_id(
        cli.kb_id.as_deref(),
        env_kb_id.as_deref(),
        config.knowledge_base_id(),
    );
    let session_config = session.configure(preset).await?;

    let region = cli.region.or_else(|| config.knowledge_base.region.clone());
    let knowledge_base = BedrockKnowledgeBase::from_env(region).await;
    let tools = ToolRegistry::with_game_tools(
        Arc::new(StaticCatalog::builtin()),
        Arc::new(knowledge_base),
        &session_config,
        &config,
    )?;

    let provider = Provider::from_config(&config, &selection)?;
    tracing::info!(provider = ?selection.provider, model = %selection.model, "using model");
    let agent = GameAgent::new(
        provider,
        tools,
        config.system_prompt.clone(),
        config.max_turns(),
    );

    session.run(&agent, Mode::from_args(&cli.query)).await
}
