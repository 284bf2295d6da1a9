//! Pass storing live streams and the channels behind them.
//!
//! Reads a single bounded page of the stream list; no pagination.

use anyhow::Result;
use chrono::Utc;
use log::{info, warn};
use rustc_hash::FxHashSet;

use super::PassReport;
use crate::api::ResourceFetcher;
use crate::config::{CollectorSettings, PassKind};
use crate::db::{
    models::{Channel, StreamSnapshot},
    store, Collection, DocumentStore,
};

/// Key of the stream array in the stream list response.
const STREAMS_KEY: &str = "streams";

/// Upserts every channel seen live and appends one snapshot per stream.
///
/// An empty stream list is treated as a bad response rather than "nobody is
/// live": it is logged and nothing is written.
pub async fn run(
    api: &dyn ResourceFetcher,
    db: &dyn DocumentStore,
    settings: &CollectorSettings,
) -> Result<PassReport> {
    let mut report = PassReport::new(PassKind::Channels);

    let mut url = api.endpoint(&settings.streams_path)?;
    url.query_pairs_mut()
        .append_pair("limit", &settings.streams_page_size.to_string());

    let resource = api.fetch(url.as_str()).await?;
    report.pages += 1;

    let items = resource.items(STREAMS_KEY);
    if items.is_empty() {
        warn!(
            "Stream list from {} is empty, skipping channel and stream writes",
            resource.url
        );
        report.anomaly = true;
        return Ok(report);
    }

    // Normalize the whole page before writing anything
    let collected_at = Utc::now();
    let mut seen = FxHashSet::default();
    let mut channels: Vec<Channel> = Vec::new();
    let mut snapshots: Vec<StreamSnapshot> = Vec::with_capacity(items.len());

    for raw in items {
        let (channel, snapshot) = StreamSnapshot::from_raw(raw, collected_at)?;
        if seen.insert(channel.id.clone()) {
            channels.push(channel);
        }
        snapshots.push(snapshot);
    }

    for channel in &channels {
        store::save(db, channel).await?;
    }
    report.record(Collection::Channels, channels.len() as u64);

    let written = store::append_all(db, &snapshots).await?;
    report.record(Collection::Streams, written);

    info!(
        "Stored {} stream snapshots and {} channels from {}",
        written,
        channels.len(),
        resource.url
    );
    Ok(report)
}
