//! Game metadata lookup tool.
//!
//! Matches a free-text keyword against a small catalog of known games. The
//! catalog sits behind [`GameCatalog`] so a real backing store can replace
//! the built-in records without touching the tool or the session loop.

use std::collections::BTreeSet;
use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{Tool, ToolResult};

/// Static metadata for a single game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub title: String,
    pub developer: String,
    pub year: u16,
    pub genre: BTreeSet<String>,
    pub platform: BTreeSet<String>,
}

impl GameRecord {
    fn new(title: &str, developer: &str, year: u16, genre: &[&str], platform: &[&str]) -> Self {
        Self {
            title: title.to_string(),
            developer: developer.to_string(),
            year,
            genre: genre.iter().map(|g| g.to_string()).collect(),
            platform: platform.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// Source of game records for the lookup tool.
pub trait GameCatalog: Send + Sync {
    /// Returns the record whose key is contained in `keyword`, if any.
    fn find(&self, keyword: &str) -> Option<&GameRecord>;
}

/// In-memory catalog keyed by lowercase substrings.
///
/// Keys are tested in insertion order and the first contained key wins,
/// so overlapping keys resolve deterministically.
pub struct StaticCatalog {
    entries: Vec<(String, GameRecord)>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Adds a record under `key`. Keys are stored lowercased.
    pub fn with(mut self, key: &str, record: GameRecord) -> Self {
        self.entries.push((key.to_lowercase(), record));
        self
    }

    /// The two records the agent ships with.
    pub fn builtin() -> Self {
        Self::new()
            .with(
                "zelda",
                GameRecord::new(
                    "The Legend of Zelda: Breath of the Wild",
                    "Nintendo",
                    2017,
                    &["Action", "Adventure"],
                    &["Switch", "Wii U"],
                ),
            )
            .with(
                "elden ring",
                GameRecord::new(
                    "Elden Ring",
                    "FromSoftware",
                    2022,
                    &["Action RPG"],
                    &["PC", "PS5", "Xbox"],
                ),
            )
    }
}

impl GameCatalog for StaticCatalog {
    fn find(&self, keyword: &str) -> Option<&GameRecord> {
        let keyword = keyword.to_lowercase();
        self.entries
            .iter()
            .find(|(key, _)| keyword.contains(key.as_str()))
            .map(|(_, record)| record)
    }
}

/// What the lookup tool hands back to the model.
///
/// A miss is an ordinary value carrying an `error` field, not a failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LookupResponse {
    Found(GameRecord),
    Missing { error: String },
}

/// Pure lookup used by [`GameInfoTool`].
pub fn lookup(catalog: &dyn GameCatalog, keyword: &str) -> LookupResponse {
    match catalog.find(keyword) {
        Some(record) => LookupResponse::Found(record.clone()),
        None => LookupResponse::Missing {
            error: format!("No game found for '{}'", keyword),
        },
    }
}

pub struct GameInfoTool {
    catalog: Arc<dyn GameCatalog>,
}

impl GameInfoTool {
    pub fn new(catalog: Arc<dyn GameCatalog>) -> Self {
        Self { catalog }
    }
}

#[derive(Deserialize)]
struct GameInfoInput {
    keyword: String,
}

#[async_trait::async_trait]
impl Tool for GameInfoTool {
    fn name(&self) -> &str {
        "get_game_info"
    }

    fn description(&self) -> &str {
        "Search game metadata (title, developer, release year, genre, platform) by keyword or title."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "keyword": {
                    "type": "string",
                    "description": "Game title or keyword to search"
                }
            },
            "required": ["keyword"]
        })
    }

    async fn execute(&self, input: Value) -> Result<ToolResult> {
        let input: GameInfoInput = serde_json::from_value(input)?;
        let response = lookup(self.catalog.as_ref(), &input.keyword);
        let body = serde_json::to_string(&response)?;
        Ok(match response {
            LookupResponse::Found(_) => ToolResult::success(body),
            LookupResponse::Missing { .. } => ToolResult::error(body),
        })
    }
}
