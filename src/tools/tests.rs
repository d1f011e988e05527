use super::*;
use crate::error::KnowledgeBaseError;
use crate::knowledge_base::Passage;
use game_info::StaticCatalog;
use serde_json::json;

struct EmptyKnowledgeBase;

#[async_trait::async_trait]
impl KnowledgeBase for EmptyKnowledgeBase {
    async fn retrieve(
        &self,
        kb_id: &str,
        _text: &str,
        _limit: i32,
    ) -> Result<Vec<Passage>, KnowledgeBaseError> {
        if kb_id == "BROKEN" {
            return Err(KnowledgeBaseError::Retrieve {
                kb_id: kb_id.to_string(),
                message: "access denied".into(),
            });
        }
        Ok(Vec::new())
    }
}

fn game_registry() -> ToolRegistry {
    let session = SessionConfig {
        knowledge_base_id: "KB-TEST".into(),
    };
    ToolRegistry::with_game_tools(
        Arc::new(StaticCatalog::builtin()),
        Arc::new(EmptyKnowledgeBase),
        &session,
        &Config::default(),
    )
    .unwrap()
}

#[tokio::test]
async fn test_registry_with_game_tools() {
    let registry = game_registry();
    assert_eq!(registry.len(), 3);
    assert_eq!(registry.names(), vec!["get_game_info", "http_request", "retrieve"]);
    let defs = registry.definitions();
    assert_eq!(defs[0].parameters["required"], json!(["keyword"]));
    assert_eq!(defs[1].parameters["required"], json!(["url"]));
    assert_eq!(defs[2].parameters["required"], json!(["text"]));
    assert!(defs.iter().all(|d| !d.description.is_empty()));
}

#[tokio::test]
async fn test_game_info_hit() {
    let registry = game_registry();
    let result = registry
        .execute("get_game_info", json!({"keyword": "zelda game info"}))
        .await
        .unwrap();
    assert!(!result.is_error);
    let value: Value = serde_json::from_str(&result.content).unwrap();
    assert_eq!(value["developer"], "Nintendo");
    assert_eq!(value["year"], 2017);
}

#[tokio::test]
async fn test_game_info_miss_is_structured() {
    let registry = game_registry();
    let result = registry
        .execute("get_game_info", json!({"keyword": "no such game"}))
        .await
        .unwrap();
    assert!(result.is_error);
    let value: Value = serde_json::from_str(&result.content).unwrap();
    assert_eq!(value, json!({"error": "No game found for 'no such game'"}));
}

#[tokio::test]
async fn test_retrieve_empty_knowledge_base() {
    let registry = game_registry();
    let result = registry
        .execute("retrieve", json!({"text": "best open world games"}))
        .await
        .unwrap();
    assert_eq!(result.content, "No results found above score threshold.");
}

#[tokio::test]
async fn test_unknown_tool() {
    let registry = game_registry();
    let result = registry.execute("nonexistent_tool", json!({})).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_adapter_reports_failures_as_text() {
    let registry = game_registry();
    let tools = registry.to_rig_tools();
    let retrieve = tools.iter().find(|t| t.name() == "retrieve").unwrap();
    let output = retrieve
        .call(json!({"text": "q", "knowledgeBaseId": "BROKEN"}).to_string())
        .await
        .unwrap();
    assert!(output.starts_with("Error: "));
    assert!(output.contains("access denied"));
}

#[tokio::test]
async fn test_adapter_rejects_malformed_arguments() {
    let registry = game_registry();
    let tools = registry.to_rig_tools();
    assert!(tools[0].call("not json".to_string()).await.is_err());
}

#[tokio::test]
async fn test_adapter_definition_matches_tool() {
    let registry = game_registry();
    let tools = registry.to_rig_tools();
    let def = tools[0].definition(String::new()).await;
    assert_eq!(def.name, "get_game_info");
    assert_eq!(def.parameters["properties"]["keyword"]["type"], "string");
}
