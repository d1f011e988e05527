//! Struct definitions and serde defaults for game-agent configuration.

use serde::{Deserialize, Serialize};

/// Root configuration, deserialized from `config.toml`.
///
/// Fields use serde defaults so the agent can run with sensible defaults
/// when no config file exists.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Default model identifier (e.g. `"claude-sonnet-4-6"`).
    #[serde(default = "default_model")]
    pub model: String,
    /// Per-provider settings.
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Default provider name (e.g., "anthropic", "openai").
    #[serde(default)]
    pub default_provider: Option<String>,
    /// System prompt given to the agent for every query.
    #[serde(default = "default_system_prompt")]
    pub system_prompt: Option<String>,
    /// Upper bound on tool-calling round-trips per query.
    #[serde(default)]
    pub max_turns: Option<usize>,
    /// Knowledge base used by the retrieve tool.
    #[serde(default)]
    pub knowledge_base: KnowledgeBaseConfig,
    /// Limits for the http_request tool.
    #[serde(default)]
    pub http: HttpConfig,
}

/// Returns the default model identifier.
///
/// Used by serde's `#[serde(default)]` attribute during deserialization.
pub(super) fn default_model() -> String {
    crate::constants::DEFAULT_MODEL.to_string()
}

/// Returns the default system prompt.
pub(super) fn default_system_prompt() -> Option<String> {
    Some(crate::constants::DEFAULT_SYSTEM_PROMPT.to_string())
}

/// Provider-specific configuration map.
///
/// Each field corresponds to a supported LLM provider. Only providers
/// the user has configured will be `Some`.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ProviderConfig {
    pub openai: Option<ProviderEntry>,
    pub anthropic: Option<ProviderEntry>,
    pub ollama: Option<ProviderEntry>,
    pub openrouter: Option<ProviderEntry>,
}

/// Connection details for a single LLM provider.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderEntry {
    /// API key for authentication. Can also be set via environment variables.
    pub api_key: Option<String>,
    /// Custom base URL for the provider's API.
    pub base_url: Option<String>,
    /// Model identifier to use with this provider.
    pub model: Option<String>,
}

/// Knowledge base settings for the retrieve tool.
///
/// The id here is the lowest-precedence source; `--kb-id` and
/// `KNOWLEDGE_BASE_ID` both win over it.
#[derive(Debug, Default, Serialize, Deserialize, Clone)]
pub struct KnowledgeBaseConfig {
    pub id: Option<String>,
    /// AWS region hosting the knowledge base.
    pub region: Option<String>,
    /// Passages requested per retrieval.
    pub number_of_results: Option<i32>,
    /// Minimum relevance score a passage needs to be returned.
    pub min_score: Option<f64>,
}

/// Settings for the http_request tool.
#[derive(Debug, Default, Serialize, Deserialize, Clone)]
pub struct HttpConfig {
    pub timeout_secs: Option<u64>,
    pub max_response_bytes: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: default_model(),
            provider: ProviderConfig::default(),
            default_provider: None,
            system_prompt: default_system_prompt(),
            max_turns: None,
            knowledge_base: KnowledgeBaseConfig::default(),
            http: HttpConfig::default(),
        }
    }
}
