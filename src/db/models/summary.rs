use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::api::{resource::LINKS_KEY, Resource};
use crate::db::store::{Collection, StoredDocument};

/// Platform-wide totals at collection time (append-only).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub date: DateTime<Utc>,
    /// Raw totals, e.g. `streams`, `channels`, `viewers`
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl Summary {
    pub fn from_resource(resource: &Resource, collected_at: DateTime<Utc>) -> Self {
        let mut payload = resource.entity_data.clone();
        for key in ["_id", "date", LINKS_KEY] {
            payload.remove(key);
        }

        Self {
            id: Uuid::new_v4(),
            date: collected_at,
            payload,
        }
    }
}

impl StoredDocument for Summary {
    const COLLECTION: Collection = Collection::Summary;

    fn document_id(&self) -> String {
        self.id.to_string()
    }
}
