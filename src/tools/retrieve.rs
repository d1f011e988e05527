//! Retrieve tool: semantic search over the session's knowledge base.

use std::sync::Arc;

use anyhow::Result;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{Tool, ToolResult};
use crate::error::KnowledgeBaseError;
use crate::knowledge_base::{KnowledgeBase, Passage};

/// Tool that queries a [`KnowledgeBase`] for passages relevant to a question.
///
/// The knowledge base id comes from the session configuration; the model
/// may override it per call.
pub struct RetrieveTool {
    backend: Arc<dyn KnowledgeBase>,
    default_kb_id: String,
    default_results: i32,
    default_min_score: f64,
}

impl RetrieveTool {
    pub fn new(
        backend: Arc<dyn KnowledgeBase>,
        default_kb_id: String,
        default_results: i32,
        default_min_score: f64,
    ) -> Self {
        Self {
            backend,
            default_kb_id,
            default_results,
            default_min_score,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RetrieveInput {
    text: String,
    number_of_results: Option<i32>,
    score: Option<f64>,
    knowledge_base_id: Option<String>,
}

/// Drops passages below `min_score`. Passages without a score are kept.
fn filter_by_score(passages: Vec<Passage>, min_score: f64) -> Vec<Passage> {
    passages
        .into_iter()
        .filter(|p| p.score.map_or(true, |s| s >= min_score))
        .collect()
}

fn format_passages(passages: &[Passage], min_score: f64) -> String {
    if passages.is_empty() {
        return "No results found above score threshold.".to_string();
    }
    let mut out = format!(
        "Retrieved {} results with score >= {}:\n",
        passages.len(),
        min_score
    );
    for passage in passages {
        out.push('\n');
        match passage.score {
            Some(score) => out.push_str(&format!("Score: {:.4}\n", score)),
            None => out.push_str("Score: n/a\n"),
        }
        if let Some(ref source) = passage.source {
            out.push_str(&format!("Source: {}\n", source));
        }
        out.push_str(&format!("Content: {}\n", passage.text.trim()));
    }
    out
}

#[async_trait::async_trait]
impl Tool for RetrieveTool {
    fn name(&self) -> &str {
        "retrieve"
    }

    fn description(&self) -> &str {
        "Retrieve relevant passages about games from the Knowledge Base. Use this before any internet search."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "text": {
                    "type": "string",
                    "description": "The query to search the knowledge base with"
                },
                "numberOfResults": {
                    "type": "integer",
                    "description": "Maximum number of passages to return"
                },
                "score": {
                    "type": "number",
                    "description": "Minimum relevance score (0.0-1.0) a passage needs"
                },
                "knowledgeBaseId": {
                    "type": "string",
                    "description": "Knowledge base to query instead of the configured one"
                }
            },
            "required": ["text"]
        })
    }

    async fn execute(&self, input: Value) -> Result<ToolResult> {
        let input: RetrieveInput = serde_json::from_value(input)?;
        let kb_id = input
            .knowledge_base_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| self.default_kb_id.clone());
        if kb_id.trim().is_empty() {
            return Err(KnowledgeBaseError::MissingId.into());
        }
        let limit = input
            .number_of_results
            .filter(|n| *n > 0)
            .unwrap_or(self.default_results);
        let min_score = input.score.unwrap_or(self.default_min_score);

        tracing::debug!(%kb_id, limit, min_score, "retrieve");
        let passages = self.backend.retrieve(&kb_id, &input.text, limit).await?;
        let passages = filter_by_score(passages, min_score);
        Ok(ToolResult::success(format_passages(&passages, min_score)))
    }
}
