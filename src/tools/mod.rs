//! Tools the agent may call while answering a question.
//!
//! Each tool implements [`Tool`]; a [`ToolRegistry`] holds them and hands
//! rig-core adapters to the provider layer.

pub mod game_info;
pub mod http_request;
pub mod retrieve;
pub mod rig_adapter;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use game_info::{GameCatalog, GameInfoTool};
use http_request::HttpRequestTool;
use retrieve::RetrieveTool;

use crate::config::Config;
use crate::knowledge_base::KnowledgeBase;
use crate::session::SessionConfig;

/// The result of executing a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub content: String,
    pub is_error: bool,
}

impl ToolResult {
    pub fn success(content: String) -> Self {
        Self {
            content,
            is_error: false,
        }
    }

    pub fn error(content: String) -> Self {
        Self {
            content,
            is_error: true,
        }
    }
}

/// Definition sent to the LLM so it knows what tools are available.
#[cfg(test)]
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value, // JSON Schema
}

/// Every tool implements this trait.
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Unique name the LLM uses to call this tool.
    fn name(&self) -> &str;

    /// Description the model uses to decide when to call the tool.
    fn description(&self) -> &str;

    /// JSON Schema describing the tool's input parameters.
    fn schema(&self) -> Value;

    /// Execute the tool with the given JSON input.
    async fn execute(&self, input: Value) -> Result<ToolResult>;
}

/// Holds all registered tools. Read-only once the session starts.
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Register a tool. Called during startup.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.push(Arc::from(tool));
    }

    /// Produce definitions for the LLM (sent in the API request).
    #[cfg(test)]
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: t.schema(),
            })
            .collect()
    }

    /// Look up a tool by name and execute it.
    #[cfg(test)]
    pub async fn execute(&self, name: &str, input: Value) -> Result<ToolResult> {
        let tool = self
            .tools
            .iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| anyhow::anyhow!("Unknown tool: {}", name))?;
        tool.execute(input).await
    }

    /// Names of the registered tools, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Converts all registered tools into rig-core [`ToolDyn`] trait objects.
    ///
    /// Returns a fresh `Vec` each call so the result can be moved into an
    /// agent builder's `.tools()` without borrow/move conflicts.
    pub fn to_rig_tools(&self) -> Vec<Box<dyn rig::tool::ToolDyn>> {
        self.tools
            .iter()
            .map(|t| {
                Box::new(rig_adapter::RigToolAdapter::new(Arc::clone(t)))
                    as Box<dyn rig::tool::ToolDyn>
            })
            .collect()
    }
}

impl ToolRegistry {
    /// Create the registry the game agent runs with: lookup, HTTP, retrieval.
    pub fn with_game_tools(
        catalog: Arc<dyn GameCatalog>,
        knowledge_base: Arc<dyn KnowledgeBase>,
        session: &SessionConfig,
        config: &Config,
    ) -> Result<Self> {
        let mut registry = Self::new();
        registry.register(Box::new(GameInfoTool::new(catalog)));
        registry.register(Box::new(HttpRequestTool::new(
            config.http_timeout(),
            config.http_max_response_bytes(),
        )?));
        registry.register(Box::new(RetrieveTool::new(
            knowledge_base,
            session.knowledge_base_id.clone(),
            config.knowledge_base_results(),
            config.knowledge_base_min_score(),
        )));
        Ok(registry)
    }
}

#[cfg(test)]
mod tests;
