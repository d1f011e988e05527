//! LLM provider client and tool-driven streaming.
//!
//! [`Provider`] wraps rig-core clients behind enum dispatch so the session
//! and agent layers never see provider-specific types.

use anyhow::{Context, Result};
use futures::StreamExt;
use rig::agent::MultiTurnStreamItem;
use rig::client::CompletionClient;
use rig::message::{Message as RigMessage, Text};
use rig::providers::{anthropic, openai, openrouter};
use rig::streaming::{StreamedAssistantContent, StreamedUserContent, StreamingChat};

use std::collections::HashMap;

use super::kind::ProviderKind;
use super::resolve::ModelSelection;
use crate::config::Config;
use crate::output::Renderer;
use crate::tools::ToolRegistry;

enum ClientKind {
    Anthropic(anthropic::Client),
    OpenAI(openai::Client),
    OpenRouter(openrouter::Client),
    Ollama(openai::Client),
}

/// A configured LLM provider ready to answer queries.
///
/// Agents are built per call; they are cheap and carry the tool set.
pub struct Provider {
    client: ClientKind,
    model: String,
}

/// Runs `$body` with `$client` bound to whichever provider client is active.
macro_rules! dispatch {
    ($self:expr, |$client:ident| $body:expr) => {
        match &$self.client {
            ClientKind::Anthropic($client) => $body,
            ClientKind::OpenAI($client) => $body,
            ClientKind::OpenRouter($client) => $body,
            ClientKind::Ollama($client) => $body,
        }
    };
}

/// Builds an agent with the given tools and optional preamble.
///
/// The two builder paths produce different types, hence a macro.
macro_rules! with_agent_tools {
    ($client:expr, $model:expr, $sys:expr, $rig_tools:expr, |$agent:ident| $body:expr) => {{
        let $agent = if let Some(sys) = $sys {
            $client
                .agent($model)
                .preamble(sys)
                .max_tokens(crate::constants::MAX_TOKENS)
                .tools($rig_tools)
                .build()
        } else {
            $client
                .agent($model)
                .max_tokens(crate::constants::MAX_TOKENS)
                .tools($rig_tools)
                .build()
        };
        $body
    }};
}

/// Drains a multi-turn stream into the renderer and the response buffer.
///
/// Text tokens are rendered and accumulated; tool calls and results are
/// announced by name. Reasoning and partial tool-call deltas are skipped.
macro_rules! process_stream_with_tools {
    ($stream:expr, $renderer:expr, $full_response:expr, $tool_names:expr) => {
        while let Some(chunk) = $stream.next().await {
            match chunk {
                Ok(MultiTurnStreamItem::StreamAssistantItem(StreamedAssistantContent::Text(
                    Text { text },
                ))) => {
                    $renderer.render_token(&text);
                    $full_response.push_str(&text);
                }
                Ok(MultiTurnStreamItem::StreamAssistantItem(
                    StreamedAssistantContent::ToolCall {
                        tool_call,
                        internal_call_id,
                    },
                )) => {
                    let name = tool_call.function.name.clone();
                    tracing::debug!(tool = %name, "model called tool");
                    $renderer.tool_start(&name, &tool_call.function.arguments.to_string());
                    $tool_names.insert(internal_call_id, name);
                }
                Ok(MultiTurnStreamItem::StreamUserItem(StreamedUserContent::ToolResult {
                    tool_result,
                    internal_call_id,
                })) => {
                    let name = $tool_names
                        .get(&internal_call_id)
                        .map(|s| s.as_str())
                        .unwrap_or("unknown");
                    let result_text: String = tool_result
                        .content
                        .into_iter()
                        .filter_map(|c| match c {
                            rig::message::ToolResultContent::Text(t) => Some(t.text),
                            _ => None,
                        })
                        .collect::<Vec<_>>()
                        .join("\n");
                    $renderer.tool_result(name, &result_text);
                }
                Ok(MultiTurnStreamItem::FinalResponse(_)) => {}
                Err(err) => {
                    anyhow::bail!("Streaming error: {}", err);
                }
                _ => {}
            }
        }
    };
}

impl Provider {
    /// Creates a [`Provider`] for the selected backend.
    ///
    /// # Errors
    ///
    /// Returns an error if no API key is found for the selected provider
    /// or if client construction fails.
    pub fn from_config(config: &Config, selection: &ModelSelection) -> Result<Self> {
        let client = match selection.provider {
            ProviderKind::Anthropic => {
                let api_key = config.resolve_api_key("anthropic").context(
                    "No API key found for Anthropic. Set ANTHROPIC_API_KEY or configure it in config.toml",
                )?;
                ClientKind::Anthropic(
                    anthropic::Client::new(&api_key)
                        .context("Failed to create Anthropic client")?,
                )
            }
            ProviderKind::OpenAI => {
                let api_key = config.resolve_api_key("openai").context(
                    "No API key found for OpenAI. Set OPENAI_API_KEY or configure it in config.toml",
                )?;
                ClientKind::OpenAI(
                    openai::Client::new(&api_key).context("Failed to create OpenAI client")?,
                )
            }
            ProviderKind::OpenRouter => {
                let api_key = config.resolve_api_key("openrouter").context(
                    "No API key found for OpenRouter. Set OPENROUTER_API_KEY or configure it in config.toml",
                )?;
                ClientKind::OpenRouter(
                    openrouter::Client::new(&api_key)
                        .context("Failed to create OpenRouter client")?,
                )
            }
            ProviderKind::Ollama => {
                let base_url = config
                    .provider
                    .ollama
                    .as_ref()
                    .and_then(|o| o.base_url.as_deref())
                    .unwrap_or(crate::constants::OLLAMA_DEFAULT_BASE_URL);
                ClientKind::Ollama(
                    openai::Client::builder()
                        .api_key("ollama")
                        .base_url(format!("{}/v1", base_url))
                        .build()
                        .context("Failed to create Ollama client")?,
                )
            }
        };
        tracing::debug!(provider = ?selection.provider, model = %selection.model, "provider ready");
        Ok(Self {
            client,
            model: selection.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Answers one prompt, letting rig-core run tool calls.
    ///
    /// Each call starts from an empty history. rig-core executes tool calls
    /// through the registry's adapters and feeds results back until the
    /// model answers or `max_turns` round-trips are spent.
    pub async fn stream_with_tools(
        &self,
        system_prompt: Option<&str>,
        prompt: &str,
        tools: &ToolRegistry,
        renderer: &mut dyn Renderer,
        max_turns: usize,
    ) -> Result<String> {
        let mut full_response = String::new();
        let mut tool_names: HashMap<String, String> = HashMap::new();

        dispatch!(self, |client| {
            // Fresh Vec per arm; the tools are moved into the builder.
            let rig_tools = tools.to_rig_tools();
            let mut stream =
                with_agent_tools!(client, &self.model, system_prompt, rig_tools, |agent| {
                    agent
                        .stream_chat(prompt.to_string(), Vec::<RigMessage>::new())
                        .multi_turn(max_turns)
                        .await
                });
            process_stream_with_tools!(stream, renderer, full_response, tool_names);
        });

        Ok(full_response)
    }
}
