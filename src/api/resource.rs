use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::CollectorError;

/// Key under which the API nests pagination and self links.
pub const LINKS_KEY: &str = "_links";

/// Relation name of the next-page link.
pub const NEXT_REL: &str = "next";

/// One fetched page of JSON from the Twitch API.
///
/// The `_links` object is peeled off into `pagination_links` when the page is
/// built, so `entity_data` only ever holds entity fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub url: String,
    pub client_id: String,
    pub entity_data: Map<String, Value>,
    pub pagination_links: BTreeMap<String, String>,
}

impl Resource {
    /// Builds a page from a decoded response body.
    ///
    /// Only string-valued links are kept; a missing or malformed `_links`
    /// gives an empty link map.
    pub fn from_body(
        url: impl Into<String>,
        client_id: impl Into<String>,
        body: Value,
    ) -> Result<Self, CollectorError> {
        let url = url.into();
        let mut entity_data = match body {
            Value::Object(map) => map,
            _ => return Err(CollectorError::UnexpectedBody { url }),
        };

        let pagination_links = match entity_data.remove(LINKS_KEY) {
            Some(Value::Object(links)) => links
                .into_iter()
                .filter_map(|(rel, href)| match href {
                    Value::String(href) => Some((rel, href)),
                    _ => None,
                })
                .collect(),
            _ => BTreeMap::new(),
        };

        Ok(Self {
            url,
            client_id: client_id.into(),
            entity_data,
            pagination_links,
        })
    }

    /// Parses a raw response body.
    pub fn from_bytes(
        url: impl Into<String>,
        client_id: impl Into<String>,
        bytes: &[u8],
    ) -> Result<Self, CollectorError> {
        let url = url.into();
        let body: Value = match serde_json::from_slice(bytes) {
            Ok(body) => body,
            Err(source) => return Err(CollectorError::Decode { url, source }),
        };
        Self::from_body(url, client_id, body)
    }

    pub fn has_next(&self) -> bool {
        self.pagination_links.contains_key(NEXT_REL)
    }

    pub fn next_url(&self) -> Option<&str> {
        self.pagination_links.get(NEXT_REL).map(String::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entity_data.get(key)
    }

    /// Items of the array stored under `key`; empty when absent or not an array.
    pub fn items(&self, key: &str) -> &[Value] {
        match self.entity_data.get(key) {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        }
    }
}
