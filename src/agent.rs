//! The game agent: one model, three tools, no memory between queries.
//!
//! Each [`Dispatcher::dispatch`] call sends the query with the system prompt
//! and lets rig-core's `multi_turn()` streaming run the tool loop via
//! [`Provider::stream_with_tools`].

use anyhow::Result;

use crate::output::Renderer;
use crate::provider::Provider;
use crate::session::Dispatcher;
use crate::tools::ToolRegistry;

pub struct GameAgent {
    provider: Provider,
    tools: ToolRegistry,
    system_prompt: Option<String>,
    max_turns: usize,
}

impl GameAgent {
    pub fn new(
        provider: Provider,
        tools: ToolRegistry,
        system_prompt: Option<String>,
        max_turns: usize,
    ) -> Self {
        tracing::debug!(
            model = provider.model(),
            tools = ?tools.names(),
            max_turns,
            "agent assembled"
        );
        Self {
            provider,
            tools,
            system_prompt,
            max_turns,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl Dispatcher for GameAgent {
    async fn dispatch(&self, query: &str, renderer: &mut dyn Renderer) -> Result<String> {
        self.provider
            .stream_with_tools(
                self.system_prompt.as_deref(),
                query,
                &self.tools,
                renderer,
                self.max_turns,
            )
            .await
    }
}
