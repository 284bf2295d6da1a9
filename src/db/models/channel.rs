use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{optional_string, required_id, EntityId};
use crate::db::store::{Collection, StoredDocument};
use crate::error::CollectorError;

/// A Twitch channel (one record per channel, overwritten on every run).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    #[serde(rename = "_id")]
    pub id: EntityId,
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub url: Option<String>,
    pub logo: Option<String>,
    pub created_at: Option<String>,
}

impl Channel {
    /// Keeps the channel identity fields and drops the rest (links, status,
    /// follower counts, ...).
    pub fn from_raw(raw: &Map<String, Value>) -> Result<Self, CollectorError> {
        Ok(Self {
            id: required_id(raw, "channel", "_id")?,
            name: optional_string(raw, "name"),
            display_name: optional_string(raw, "display_name"),
            url: optional_string(raw, "url"),
            logo: optional_string(raw, "logo"),
            created_at: optional_string(raw, "created_at"),
        })
    }
}

impl StoredDocument for Channel {
    const COLLECTION: Collection = Collection::Channels;

    fn document_id(&self) -> String {
        self.id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn raw_channel() -> Value {
        json!({
            "_id": 23161357,
            "name": "lirik",
            "display_name": "LIRIK",
            "url": "http://www.twitch.tv/lirik",
            "logo": "http://static-cdn.jtvnw.net/jtv_user_pictures/lirik-profile_image.png",
            "created_at": "2011-06-03T17:49:19Z",
            "status": "Variety",
            "followers": 123456,
            "_links": {"self": "https://api.twitch.tv/kraken/channels/lirik"}
        })
    }

    #[test]
    fn test_channel_keeps_only_identity_fields() {
        let channel = Channel::from_raw(raw_channel().as_object().unwrap()).unwrap();
        let doc = channel.to_document().unwrap();

        assert_eq!(doc.id, "23161357");
        assert_eq!(
            doc.body,
            json!({
                "_id": 23161357,
                "name": "lirik",
                "display_name": "LIRIK",
                "url": "http://www.twitch.tv/lirik",
                "logo": "http://static-cdn.jtvnw.net/jtv_user_pictures/lirik-profile_image.png",
                "created_at": "2011-06-03T17:49:19Z"
            })
        );
    }

    #[test]
    fn test_channel_normalization_is_deterministic() {
        let raw = raw_channel();
        let first = Channel::from_raw(raw.as_object().unwrap()).unwrap();
        let second = Channel::from_raw(raw.as_object().unwrap()).unwrap();

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_vec(&first).unwrap(),
            serde_json::to_vec(&second).unwrap()
        );
    }

    #[test]
    fn test_missing_optional_fields_are_null() {
        let channel = Channel::from_raw(json!({"_id": 5, "logo": null}).as_object().unwrap()).unwrap();
        assert_eq!(channel.name, None);
        assert_eq!(channel.logo, None);
        assert_eq!(serde_json::to_value(&channel).unwrap()["display_name"], Value::Null);
    }

    #[test]
    fn test_missing_id_fails() {
        let err = Channel::from_raw(json!({"name": "lirik"}).as_object().unwrap()).unwrap_err();
        assert!(matches!(
            err,
            CollectorError::Normalize {
                entity: "channel",
                field: "_id"
            }
        ));
    }
}
