use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::{as_object, optional_count, EntityId, Game};
use crate::db::store::{Collection, StoredDocument};
use crate::error::CollectorError;

/// Popularity of one game at collection time (append-only).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameStat {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub game_id: EntityId,
    pub viewers: Option<u64>,
    pub channels: Option<u64>,
    pub date: DateTime<Utc>,
}

impl GameStat {
    pub fn new(
        game_id: EntityId,
        viewers: Option<u64>,
        channels: Option<u64>,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            game_id,
            viewers,
            channels,
            date,
        }
    }

    /// Normalizes one entry of the top-games list:
    /// `{"game": {...}, "viewers": n, "channels": n}`.
    pub fn from_top_entry(
        entry: &Value,
        collected_at: DateTime<Utc>,
    ) -> Result<(Game, Self), CollectorError> {
        let entry: &Map<String, Value> = as_object(entry, "top game")?;
        let game = match entry.get("game") {
            Some(Value::Object(raw_game)) => Game::from_raw(raw_game)?,
            _ => return Err(CollectorError::normalize("top game", "game")),
        };

        let stat = Self::new(
            game.id.clone(),
            optional_count(entry, "viewers"),
            optional_count(entry, "channels"),
            collected_at,
        );

        Ok((game, stat))
    }
}

impl StoredDocument for GameStat {
    const COLLECTION: Collection = Collection::GameStats;

    fn document_id(&self) -> String {
        self.id.to_string()
    }
}
