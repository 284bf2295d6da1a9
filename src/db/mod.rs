use std::sync::Arc;

use log::info;

use crate::config::Settings;

pub mod models;
pub mod postgres;
pub mod store;

pub use postgres::PostgresClient;
pub use store::{Collection, Document, DocumentStore, StoredDocument};

/// Storage handle shared by every pass of a run.
///
/// Collections live in PostgreSQL as JSONB documents; see
/// `schema/postgres.sql`.
#[derive(Clone)]
pub struct Database {
    pub postgres: Arc<PostgresClient>,
}

impl Database {
    pub async fn new(settings: Arc<Settings>) -> anyhow::Result<Self> {
        let postgres = PostgresClient::new(settings.postgres.clone()).await?;

        postgres.migrate().await?;
        info!("Document store ready");

        Ok(Self {
            postgres: Arc::new(postgres),
        })
    }

    pub fn store(&self) -> Arc<dyn DocumentStore> {
        self.postgres.clone()
    }
}
