//! Centralized constants for game-agent.
//!
//! Default strings, console protocol text, and tool limits live here so they
//! can be changed in one place.

/// Application name used in CLI output and directory paths.
pub const APP_NAME: &str = "game-agent";

/// Default LLM model identifier.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-6";

/// Maximum tokens for LLM completions.
pub const MAX_TOKENS: u64 = 4096;

/// Default upper bound on tool-calling round-trips per query.
pub const DEFAULT_MAX_TURNS: usize = 10;

/// Default system prompt for the game information agent.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a game information assistant. \
Analyze game data and answer questions.

To answer questions, use tools in the following order:
1. **Use retrieve tool first**: Always use the retrieve tool to search the Knowledge Base for game information.
2. **Internet search**: Only use http_request tool when Knowledge Base doesn't have enough information.

Important: For game-related questions, always search the Knowledge Base using retrieve tool first.";

/// Configuration filename.
pub const CONFIG_FILENAME: &str = "config.toml";

/// Per-project configuration filename.
pub const PROJECT_CONFIG_FILENAME: &str = "game-agent.toml";

/// Readline history filename.
pub const HISTORY_FILENAME: &str = "history.txt";

/// Default LLM model identifier for OpenAI.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4.1";

/// Default LLM model identifier for OpenRouter.
pub const DEFAULT_OPENROUTER_MODEL: &str = "amazon/nova-lite-v1";

/// Default base URL for local Ollama server.
pub const OLLAMA_DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Default LLM model identifier for Ollama.
pub const OLLAMA_DEFAULT_MODEL: &str = "llama3";

/// Default provider when none is configured.
pub const DEFAULT_PROVIDER: &str = "anthropic";

// --- Knowledge base ---

/// Environment variable holding the knowledge base identifier.
pub const KNOWLEDGE_BASE_ENV: &str = "KNOWLEDGE_BASE_ID";

/// Region used for the knowledge base when neither config nor the AWS chain sets one.
pub const DEFAULT_KB_REGION: &str = "us-west-2";

/// Default number of passages requested per retrieval.
pub const DEFAULT_KB_RESULTS: i32 = 10;

/// Default minimum relevance score for retrieved passages.
pub const DEFAULT_KB_MIN_SCORE: f64 = 0.4;

// --- Console protocol ---

/// Prompt shown before every interactive query.
pub const QUERY_PROMPT: &str = "Ask about games: ";

/// Prompt shown when the knowledge base id must be entered by hand.
pub const KB_ID_PROMPT: &str = "Enter Knowledge Base ID: ";

/// Banner printed when interactive mode starts.
pub const BANNER: &str = "Game Information Agent started. Type 'exit' or 'quit' to stop.";

/// Notice printed on empty interactive input.
pub const EMPTY_INPUT_NOTICE: &str = "Please enter a question.";

/// Notice printed when the line editor could not read a typed line.
pub const INPUT_DISCARDED_NOTICE: &str =
    "That line could not be read and was discarded. Please type it again.";

/// Notice printed when the session terminates.
pub const SHUTDOWN_NOTICE: &str = "Shutting down agent.";

/// Inputs that end the interactive loop (matched case-insensitively).
pub const EXIT_KEYWORDS: &[&str] = &["exit", "quit", "q"];

// --- Tool limits ---

/// Default timeout for the http_request tool.
pub const HTTP_DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default cap on the response body returned by the http_request tool.
pub const HTTP_MAX_RESPONSE_BYTES: usize = 20_000;

/// User agent sent by the http_request tool.
pub const HTTP_USER_AGENT: &str = "Mozilla/5.0 (compatible; game-agent/0.1)";
