//! Error types for the collector.

use thiserror::Error;

/// Errors raised while fetching or normalizing API data.
///
/// Storage and setup failures are reported as `anyhow::Error` with context;
/// these typed variants stay reachable as the root cause through
/// `anyhow::Error::downcast_ref`.
#[derive(Error, Debug)]
pub enum CollectorError {
    /// Retry budget for a single fetch exhausted
    #[error(
        "network error fetching {}: {} after {} attempts",
        .url,
        display_status(.status),
        .attempts
    )]
    Network {
        status: Option<u16>,
        url: String,
        attempts: u32,
    },

    /// Response body was not valid JSON
    #[error("failed to decode JSON from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// Response body was JSON but not an object
    #[error("expected a JSON object from {url}")]
    UnexpectedBody { url: String },

    /// `fetch_next` called on the last page
    #[error("no next page link on {url}")]
    NoNextPage { url: String },

    /// A required identifying field is missing from a raw entity
    #[error("cannot normalize {entity}: missing or invalid `{field}`")]
    Normalize {
        entity: &'static str,
        field: &'static str,
    },

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

fn display_status(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!("HTTP {}", code),
        None => "transport failure".to_string(),
    }
}

impl CollectorError {
    pub fn normalize(entity: &'static str, field: &'static str) -> Self {
        Self::Normalize { entity, field }
    }

    /// Last HTTP status seen before the retry budget ran out.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Network { status, .. } => *status,
            _ => None,
        }
    }
}
