//! Pass storing platform-wide totals.

use anyhow::Result;
use chrono::Utc;
use log::info;

use super::PassReport;
use crate::api::ResourceFetcher;
use crate::config::{CollectorSettings, PassKind};
use crate::db::{models::Summary, store, Collection, DocumentStore};

/// Fetches the stream summary once and appends it with the collection time.
pub async fn run(
    api: &dyn ResourceFetcher,
    db: &dyn DocumentStore,
    settings: &CollectorSettings,
) -> Result<PassReport> {
    let mut report = PassReport::new(PassKind::Summary);

    let url = api.endpoint(&settings.summary_path)?;
    let resource = api.fetch(url.as_str()).await?;
    report.pages += 1;

    let summary = Summary::from_resource(&resource, Utc::now());
    store::append(db, &summary).await?;
    report.record(Collection::Summary, 1);

    info!("Stored summary {} from {}", summary.id, resource.url);
    Ok(report)
}
