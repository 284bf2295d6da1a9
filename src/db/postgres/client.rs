use anyhow::Context;
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use log::{info, warn};
use tokio_postgres::NoTls;

use crate::config::PostgresSettings;

/// Statements of a plain DDL script: `--` comment lines dropped, split on `;`.
fn schema_statements(sql: &str) -> Vec<String> {
    let uncommented: String = sql
        .lines()
        .filter(|line| !line.trim_start().starts_with("--"))
        .collect::<Vec<_>>()
        .join("\n");

    uncommented
        .split(';')
        .map(str::trim)
        .filter(|stmt| !stmt.is_empty())
        .map(str::to_string)
        .collect()
}

/// PostgreSQL client holding the document collections.
///
/// Each collection is a table of `(id, doc JSONB)` rows in the
/// `twitchstats` schema.
#[derive(Clone)]
pub struct PostgresClient {
    pub pool: Pool,
    schema_file: String,
}

impl PostgresClient {
    /// Builds the pool and waits for a first connection, retrying
    /// `connect_retries` times.
    pub async fn new(settings: PostgresSettings) -> anyhow::Result<Self> {
        info!(
            "Connecting to PostgreSQL at {}:{}/{}",
            settings.host, settings.port, settings.database
        );

        let mut pg_config = tokio_postgres::Config::new();
        pg_config
            .host(&settings.host)
            .port(settings.port)
            .user(&settings.user)
            .password(&settings.password)
            .dbname(&settings.database);

        let manager = Manager::from_config(
            pg_config,
            NoTls,
            ManagerConfig {
                recycling_method: RecyclingMethod::Fast,
            },
        );
        let pool = Pool::builder(manager)
            .max_size(settings.pool_size)
            .build()
            .context("Failed to create PostgreSQL connection pool")?;

        let max_attempts = settings.connect_retries.saturating_add(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match pool.get().await {
                Ok(_conn) => {
                    info!("Connected to PostgreSQL (attempt {}/{})", attempt, max_attempts);
                    return Ok(Self {
                        pool,
                        schema_file: settings.schema_file,
                    });
                },
                Err(e) if attempt < max_attempts => {
                    warn!(
                        "Failed to connect to PostgreSQL (attempt {}/{}): {}",
                        attempt, max_attempts, e
                    );
                    tokio::time::sleep(settings.connect_retry_delay()).await;
                },
                Err(e) => {
                    return Err(e).with_context(|| {
                        format!("Failed to connect to PostgreSQL after {} attempts", attempt)
                    });
                },
            }
        }
    }

    /// Creates the schema and collection tables if missing.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        info!("Applying schema from {}", self.schema_file);
        let client = self.pool.get().await?;

        let schema = tokio::fs::read_to_string(&self.schema_file)
            .await
            .with_context(|| format!("Failed to read {}", self.schema_file))?;

        let statements = schema_statements(&schema);
        for stmt in &statements {
            client
                .batch_execute(stmt)
                .await
                .with_context(|| format!("Failed to apply schema statement: {}", stmt))?;
        }

        info!("Schema ready ({} statements)", statements.len());
        Ok(())
    }
}
