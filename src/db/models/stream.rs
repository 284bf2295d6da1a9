use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::{required_id, Channel, EntityId};
use crate::api::resource::LINKS_KEY;
use crate::db::store::{Collection, StoredDocument};
use crate::error::CollectorError;

/// Keys owned by the snapshot itself; raw stream fields with these names are
/// dropped so they cannot collide with them.
const RESERVED_KEYS: [&str; 4] = ["_id", "sid", "channel_id", "date"];

/// One observation of a live stream.
///
/// Snapshots are append-only: every run stores a new one per live stream
/// under a fresh id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamSnapshot {
    #[serde(rename = "_id")]
    pub id: Uuid,
    /// Platform stream id
    pub sid: EntityId,
    pub channel_id: EntityId,
    pub date: DateTime<Utc>,
    /// Everything else the API reported (viewers, game, preview, channel, ...)
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl StreamSnapshot {
    /// Splits a raw stream into its channel record and a snapshot.
    ///
    /// The embedded channel object stays in the snapshot metadata, minus its
    /// links, so the channel state at observation time is kept.
    pub fn from_raw(
        raw: &Value,
        collected_at: DateTime<Utc>,
    ) -> Result<(Channel, Self), CollectorError> {
        let mut metadata = raw
            .as_object()
            .cloned()
            .ok_or_else(|| CollectorError::normalize("stream", "_id"))?;

        let sid = required_id(&metadata, "stream", "_id")?;
        metadata.remove(LINKS_KEY);

        let channel = match metadata.get_mut("channel") {
            Some(Value::Object(channel_raw)) => {
                channel_raw.remove(LINKS_KEY);
                Channel::from_raw(channel_raw)?
            },
            _ => return Err(CollectorError::normalize("stream", "channel")),
        };

        for key in RESERVED_KEYS {
            metadata.remove(key);
        }

        let snapshot = Self {
            id: Uuid::new_v4(),
            sid,
            channel_id: channel.id.clone(),
            date: collected_at,
            metadata,
        };

        Ok((channel, snapshot))
    }
}

impl StoredDocument for StreamSnapshot {
    const COLLECTION: Collection = Collection::Streams;

    fn document_id(&self) -> String {
        self.id.to_string()
    }
}
