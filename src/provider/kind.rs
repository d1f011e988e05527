//! Supported LLM backends and their default models.

use std::str::FromStr;

use anyhow::{anyhow, Error};

/// Identifies which LLM provider answers queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Anthropic,
    /// OpenAI, via the Responses API.
    OpenAI,
    /// OpenRouter gateway; the default route to Amazon Nova models.
    OpenRouter,
    /// Local models through Ollama's OpenAI-compatible endpoint.
    Ollama,
}

impl FromStr for ProviderKind {
    type Err = Error;

    /// Case-insensitive; unknown names are an error.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "anthropic" => Ok(Self::Anthropic),
            "openai" => Ok(Self::OpenAI),
            "openrouter" => Ok(Self::OpenRouter),
            "ollama" => Ok(Self::Ollama),
            other => Err(anyhow!(
                "Unknown provider: {other}. Supported: anthropic, openai, openrouter, ollama"
            )),
        }
    }
}

impl ProviderKind {
    pub fn default_model(self) -> &'static str {
        match self {
            Self::Anthropic => crate::constants::DEFAULT_MODEL,
            Self::OpenAI => crate::constants::DEFAULT_OPENAI_MODEL,
            Self::OpenRouter => crate::constants::DEFAULT_OPENROUTER_MODEL,
            Self::Ollama => crate::constants::OLLAMA_DEFAULT_MODEL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(
            "OpenRouter".parse::<ProviderKind>().unwrap(),
            ProviderKind::OpenRouter
        );
        assert_eq!(
            " ollama ".parse::<ProviderKind>().unwrap(),
            ProviderKind::Ollama
        );
    }

    #[test]
    fn test_unknown_provider_lists_supported() {
        let err = "bedrock".parse::<ProviderKind>().unwrap_err();
        assert!(err.to_string().contains("Supported: anthropic"));
    }

    #[test]
    fn test_openrouter_defaults_to_nova() {
        assert_eq!(
            ProviderKind::OpenRouter.default_model(),
            "amazon/nova-lite-v1"
        );
    }
}
