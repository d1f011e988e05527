//! File loading and merging for game-agent configuration.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::types::{
    default_model, default_system_prompt, Config, HttpConfig, KnowledgeBaseConfig, ProviderConfig,
};

impl Config {
    /// Loads the global config from `~/.config/game-agent/config.toml`.
    ///
    /// If no config file exists, creates one with defaults (including
    /// `{env:VAR}` placeholders for API keys) and returns it.
    pub(super) fn load_global() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            let default_toml = default_config_toml();
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, &default_toml)
                .with_context(|| format!("Failed to write default config to {:?}", path))?;
            tracing::info!(path = %path.display(), "wrote default config");
            return toml::from_str(&default_toml)
                .with_context(|| "Failed to parse default config".to_string());
        }
        Self::load_from(&path)
    }

    /// Reads and parses a single config file.
    pub(super) fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        toml::from_str(&contents).with_context(|| format!("Failed to parse config at {:?}", path))
    }

    /// Look for game-agent.toml in current dir, then walk up to git root.
    pub(super) fn load_project() -> Result<Option<Config>> {
        match find_project_config(std::env::current_dir()?) {
            Some(path) => {
                tracing::debug!(path = %path.display(), "using project config");
                Self::load_from(&path).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Merge project config over global config.
    /// Project values win when present.
    pub(super) fn merge(global: Config, project: Config) -> Config {
        Config {
            model: if project.model != default_model() {
                project.model
            } else {
                global.model
            },
            provider: ProviderConfig {
                openai: project.provider.openai.or(global.provider.openai),
                anthropic: project.provider.anthropic.or(global.provider.anthropic),
                ollama: project.provider.ollama.or(global.provider.ollama),
                openrouter: project.provider.openrouter.or(global.provider.openrouter),
            },
            default_provider: project.default_provider.or(global.default_provider),
            // An omitted prompt deserializes to the default, so only a changed one overrides.
            system_prompt: if project.system_prompt != default_system_prompt() {
                project.system_prompt
            } else {
                global.system_prompt
            },
            max_turns: project.max_turns.or(global.max_turns),
            knowledge_base: KnowledgeBaseConfig {
                id: project.knowledge_base.id.or(global.knowledge_base.id),
                region: project.knowledge_base.region.or(global.knowledge_base.region),
                number_of_results: project
                    .knowledge_base
                    .number_of_results
                    .or(global.knowledge_base.number_of_results),
                min_score: project
                    .knowledge_base
                    .min_score
                    .or(global.knowledge_base.min_score),
            },
            http: HttpConfig {
                timeout_secs: project.http.timeout_secs.or(global.http.timeout_secs),
                max_response_bytes: project
                    .http
                    .max_response_bytes
                    .or(global.http.max_response_bytes),
            },
        }
    }
}

/// Walks from `start` up to the git root looking for a project config file.
fn find_project_config(start: PathBuf) -> Option<PathBuf> {
    let mut dir = start;
    loop {
        let candidate = dir.join(crate::constants::PROJECT_CONFIG_FILENAME);
        if candidate.exists() {
            return Some(candidate);
        }
        // Stop at git root or filesystem root
        if dir.join(".git").exists() || !dir.pop() {
            return None;
        }
    }
}

fn default_config_toml() -> String {
    format!(
        r#"model = "{}"

[provider]

[provider.anthropic]
api_key = "{{env:ANTHROPIC_API_KEY}}"

[provider.openai]
api_key = "{{env:OPENAI_API_KEY}}"

[provider.openrouter]
api_key = "{{env:OPENROUTER_API_KEY}}"

[provider.ollama]
base_url = "{}"

[knowledge_base]
number_of_results = {}
min_score = {}

[http]
timeout_secs = {}
"#,
        default_model(),
        crate::constants::OLLAMA_DEFAULT_BASE_URL,
        crate::constants::DEFAULT_KB_RESULTS,
        crate::constants::DEFAULT_KB_MIN_SCORE,
        crate::constants::HTTP_DEFAULT_TIMEOUT_SECS,
    )
}
