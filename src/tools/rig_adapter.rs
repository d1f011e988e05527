//! Adapter from the crate's [`Tool`] trait to rig-core's [`ToolDyn`].
//!
//! rig-core drives the tool-calling loop; this adapter exposes each
//! registered tool's name, schema, and execution to it.

use std::pin::Pin;
use std::sync::Arc;

use rig::completion::ToolDefinition as RigToolDefinition;
use rig::tool::{ToolDyn, ToolError};

use super::Tool;

/// Wraps an `Arc<dyn Tool>` for registration with a rig-core agent.
///
/// Tool output goes back to the model as plain text. Failures become an
/// `Error: ...` string so the model can react instead of the stream aborting.
pub struct RigToolAdapter {
    tool: Arc<dyn Tool>,
}

impl RigToolAdapter {
    pub fn new(tool: Arc<dyn Tool>) -> Self {
        Self { tool }
    }
}

impl ToolDyn for RigToolAdapter {
    fn name(&self) -> String {
        self.tool.name().to_string()
    }

    fn definition<'a>(
        &'a self,
        _prompt: String,
    ) -> Pin<Box<dyn std::future::Future<Output = RigToolDefinition> + Send + 'a>> {
        let name = self.tool.name().to_string();
        let description = self.tool.description().to_string();
        let parameters = self.tool.schema();
        Box::pin(async move {
            RigToolDefinition {
                name,
                description,
                parameters,
            }
        })
    }

    fn call<'a>(
        &'a self,
        args: String,
    ) -> Pin<Box<dyn std::future::Future<Output = Result<String, ToolError>> + Send + 'a>> {
        Box::pin(async move {
            let input: serde_json::Value =
                serde_json::from_str(&args).map_err(ToolError::JsonError)?;
            let name = self.tool.name();
            match self.tool.execute(input).await {
                Ok(result) => {
                    tracing::debug!(tool = name, is_error = result.is_error, "tool finished");
                    Ok(result.content)
                }
                Err(e) => {
                    // Returned as text: a ToolError comes back nested several
                    // times over by rig-core's tool server.
                    tracing::warn!(tool = name, error = %e, "tool failed");
                    Ok(format!("Error: {}", e))
                }
            }
        })
    }
}
