use async_trait::async_trait;
use log::error;
use serde_json::Value;

use crate::db::postgres::PostgresClient;
use crate::db::store::{Collection, Document, DocumentStore};

/// Rows per multi-row INSERT.
const BATCH_SIZE: usize = 500;

/// Removes null bytes, which PostgreSQL rejects inside JSONB strings.
fn sanitize_json(value: &Value) -> Value {
    match value {
        Value::String(s) if s.contains('\0') => Value::String(s.replace('\0', "")),
        Value::Array(items) => Value::Array(items.iter().map(sanitize_json).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.replace('\0', ""), sanitize_json(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn table(collection: Collection) -> String {
    format!("twitchstats.{}", collection.name())
}

#[async_trait]
impl DocumentStore for PostgresClient {
    /// Batch insert (true multi-row VALUES, chunked).
    async fn insert_many(&self, collection: Collection, docs: &[Document]) -> anyhow::Result<u64> {
        if docs.is_empty() {
            return Ok(0);
        }

        const COLS_PER_ROW: usize = 2;

        let client = self.pool.get().await?;
        let mut written = 0;

        for chunk in docs.chunks(BATCH_SIZE) {
            let values_clauses: Vec<String> = (0..chunk.len())
                .map(|i| {
                    let start = i * COLS_PER_ROW + 1;
                    format!("(${}, ${})", start, start + 1)
                })
                .collect();

            let query = format!(
                "INSERT INTO {} (id, doc) VALUES {}",
                table(collection),
                values_clauses.join(", ")
            );

            let bodies: Vec<Value> = chunk.iter().map(|doc| sanitize_json(&doc.body)).collect();

            let mut params: Vec<&(dyn tokio_postgres::types::ToSql + Sync)> =
                Vec::with_capacity(chunk.len() * COLS_PER_ROW);
            for (doc, body) in chunk.iter().zip(bodies.iter()) {
                params.push(&doc.id);
                params.push(body);
            }

            written += client.execute(&query, &params).await.map_err(|e| {
                error!(
                    "Failed to insert {} documents into {}: {:?}",
                    chunk.len(),
                    collection,
                    e
                );
                e
            })?;
        }

        Ok(written)
    }

    async fn upsert(&self, collection: Collection, doc: &Document) -> anyhow::Result<()> {
        let client = self.pool.get().await?;
        let query = format!(
            r#"
            INSERT INTO {} (id, doc) VALUES ($1, $2)
            ON CONFLICT (id) DO UPDATE SET
                doc = EXCLUDED.doc,
                updated_at = now()
            "#,
            table(collection)
        );

        let body = sanitize_json(&doc.body);
        client
            .execute(&query, &[&doc.id, &body])
            .await
            .map_err(|e| {
                error!("Failed to upsert {} {}: {:?}", collection, doc.id, e);
                e
            })?;

        Ok(())
    }
}
