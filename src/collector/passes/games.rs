//! Pass storing game popularity.
//!
//! Follows `next` links through the top-games list until a page comes back
//! empty or has no further link. Each entry is written as soon as it is read
//! so progress survives a failure on a later page.

use anyhow::Result;
use chrono::Utc;
use log::{debug, info, warn};

use super::PassReport;
use crate::api::ResourceFetcher;
use crate::config::{CollectorSettings, PassKind};
use crate::db::{models::GameStat, store, Collection, DocumentStore};

/// Key of the entry array in the top-games response.
const TOP_KEY: &str = "top";

pub async fn run(
    api: &dyn ResourceFetcher,
    db: &dyn DocumentStore,
    settings: &CollectorSettings,
) -> Result<PassReport> {
    let mut report = PassReport::new(PassKind::Games);

    let mut url = api.endpoint(&settings.games_path)?;
    url.query_pairs_mut()
        .append_pair("limit", &settings.games_page_size.to_string())
        .append_pair("offset", "0");

    let mut page = api.fetch(url.as_str()).await?;

    loop {
        report.pages += 1;

        let entries = page.items(TOP_KEY);
        if entries.is_empty() {
            debug!("Top games page {} is empty, stopping", page.url);
            break;
        }

        for entry in entries {
            let (game, stat) = GameStat::from_top_entry(entry, Utc::now())?;
            store::save(db, &game).await?;
            report.record(Collection::Games, 1);
            store::append(db, &stat).await?;
            report.record(Collection::GameStats, 1);
        }

        debug!("Stored {} top games from {}", entries.len(), page.url);

        let next = match page.next_url() {
            Some(next) => next,
            None => break,
        };
        if next == page.url {
            warn!("Top games page {} links to itself, stopping", page.url);
            break;
        }
        if let Some(max_pages) = settings.games_max_pages {
            if report.pages >= max_pages {
                warn!(
                    "Reached games_max_pages ({}), not following {}",
                    max_pages, next
                );
                break;
            }
        }

        page = api.fetch_next(&page).await?;
    }

    info!(
        "Stored {} game statistics across {} page(s)",
        report.written(Collection::GameStats),
        report.pages
    );
    Ok(report)
}
