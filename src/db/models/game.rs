use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{optional_string, required_id, EntityId};
use crate::db::store::{Collection, StoredDocument};
use crate::error::CollectorError;

/// A game known to Twitch (one record per game, overwritten on every run).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    #[serde(rename = "_id")]
    pub id: EntityId,
    /// Giant Bomb catalog id
    pub giantbomb_id: Option<EntityId>,
    pub name: Option<String>,
}

impl Game {
    pub fn from_raw(raw: &Map<String, Value>) -> Result<Self, CollectorError> {
        Ok(Self {
            id: required_id(raw, "game", "_id")?,
            giantbomb_id: raw.get("giantbomb_id").and_then(EntityId::from_value),
            name: optional_string(raw, "name"),
        })
    }
}

impl StoredDocument for Game {
    const COLLECTION: Collection = Collection::Games;

    fn document_id(&self) -> String {
        self.id.to_string()
    }
}
