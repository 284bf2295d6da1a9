//! Stored record shapes and the normalizers that build them from raw API
//! entities.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CollectorError;

mod channel;
mod game;
mod game_stat;
mod stream;
mod summary;

pub use channel::Channel;
pub use game::Game;
pub use game_stat::GameStat;
pub use stream::StreamSnapshot;
pub use summary::Summary;

/// Platform-assigned identifier.
///
/// Twitch sends numeric ids, but string ids are accepted as well; the JSON
/// type is preserved when the record is stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Int(u64),
    Str(String),
}

impl EntityId {
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_u64().map(Self::Int),
            Value::String(s) if !s.trim().is_empty() => Some(Self::Str(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{}", n),
            Self::Str(s) => f.write_str(s),
        }
    }
}

pub(crate) fn as_object<'a>(
    raw: &'a Value,
    entity: &'static str,
) -> Result<&'a Map<String, Value>, CollectorError> {
    raw.as_object()
        .ok_or_else(|| CollectorError::normalize(entity, "_id"))
}

pub(crate) fn required_id(
    raw: &Map<String, Value>,
    entity: &'static str,
    field: &'static str,
) -> Result<EntityId, CollectorError> {
    raw.get(field)
        .and_then(EntityId::from_value)
        .ok_or_else(|| CollectorError::normalize(entity, field))
}

pub(crate) fn optional_string(raw: &Map<String, Value>, field: &str) -> Option<String> {
    raw.get(field).and_then(Value::as_str).map(str::to_string)
}

pub(crate) fn optional_count(raw: &Map<String, Value>, field: &str) -> Option<u64> {
    raw.get(field).and_then(Value::as_u64)
}
