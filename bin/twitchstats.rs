use std::sync::Arc;

use anyhow::Context;
use jemallocator::Jemalloc;
use log::{info, LevelFilter};
use simple_logger::SimpleLogger;

#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use twitchstats::{ApiClient, Collector, Database, Settings};

#[tokio::main()]
async fn main() -> anyhow::Result<()> {
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .env()
        .init()
        .context("Failed to initialize logger")?;

    // Load configuration
    let settings = Arc::new(
        Settings::new()
            .context("Failed to load config.yaml. Please ensure it exists and is valid")?,
    );

    let db = Database::new(settings.clone())
        .await
        .context("Failed to initialize database connection")?;

    let api = ApiClient::new(settings.api.clone()).context("Failed to build API client")?;

    info!(
        "Collecting from {} with passes {:?}",
        settings.api.base_url, settings.collector.passes
    );

    let collector = Collector::new(Arc::new(api), db.store(), settings.collector.clone());

    // Failed passes are logged by the collector; the returned error sets the exit code
    collector.run().await?;

    Ok(())
}
