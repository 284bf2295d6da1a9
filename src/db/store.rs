use std::fmt;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

/// Named document collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Summary,
    Channels,
    Streams,
    Games,
    GameStats,
}

impl Collection {
    pub const ALL: [Collection; 5] = [
        Collection::Summary,
        Collection::Channels,
        Collection::Streams,
        Collection::Games,
        Collection::GameStats,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::Channels => "channels",
            Self::Streams => "streams",
            Self::Games => "games",
            Self::GameStats => "gamestats",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One stored JSON document and its key.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub body: Value,
}

/// A record with a fixed home collection.
pub trait StoredDocument: Serialize {
    const COLLECTION: Collection;

    fn document_id(&self) -> String;

    fn to_document(&self) -> anyhow::Result<Document> {
        Ok(Document {
            id: self.document_id(),
            body: serde_json::to_value(self)?,
        })
    }
}

/// Write side of the document database.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Appends documents; returns the number written.
    async fn insert_many(&self, collection: Collection, docs: &[Document]) -> anyhow::Result<u64>;

    /// Inserts or overwrites the document with the same id.
    async fn upsert(&self, collection: Collection, doc: &Document) -> anyhow::Result<()>;

    async fn insert(&self, collection: Collection, doc: &Document) -> anyhow::Result<()> {
        self.insert_many(collection, std::slice::from_ref(doc))
            .await
            .map(|_| ())
    }
}

pub async fn save<T: StoredDocument + Sync>(
    store: &dyn DocumentStore,
    record: &T,
) -> anyhow::Result<()> {
    store.upsert(T::COLLECTION, &record.to_document()?).await
}

pub async fn append<T: StoredDocument + Sync>(
    store: &dyn DocumentStore,
    record: &T,
) -> anyhow::Result<()> {
    store.insert(T::COLLECTION, &record.to_document()?).await
}

pub async fn append_all<T: StoredDocument + Sync>(
    store: &dyn DocumentStore,
    records: &[T],
) -> anyhow::Result<u64> {
    let docs = records
        .iter()
        .map(StoredDocument::to_document)
        .collect::<anyhow::Result<Vec<_>>>()?;
    store.insert_many(T::COLLECTION, &docs).await
}
