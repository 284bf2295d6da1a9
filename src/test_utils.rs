//! In-memory doubles for the API and the document store.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use url::Url;

use crate::api::{Resource, ResourceFetcher};
use crate::db::{Collection, Document, DocumentStore};
use crate::error::CollectorError;

pub const FAKE_BASE_URL: &str = "https://api.test/kraken/";
pub const FAKE_CLIENT_ID: &str = "twitchstats-test";

enum FakeResponse {
    Page(Value),
    Fail(u16),
}

/// `ResourceFetcher` serving canned pages by URL.
///
/// Unknown URLs fail like a 404 that exhausted its retries.
pub struct FakeApi {
    base: Url,
    responses: Mutex<HashMap<String, FakeResponse>>,
    fetched: Mutex<Vec<String>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            base: Url::parse(FAKE_BASE_URL).unwrap(),
            responses: Mutex::new(HashMap::new()),
            fetched: Mutex::new(Vec::new()),
        }
    }

    fn key(&self, path: &str) -> String {
        self.base.join(path).unwrap().to_string()
    }

    pub fn page(&self, path: &str, body: Value) {
        let key = self.key(path);
        self.responses
            .lock()
            .unwrap()
            .insert(key, FakeResponse::Page(body));
    }

    pub fn fail(&self, path: &str, status: u16) {
        let key = self.key(path);
        self.responses
            .lock()
            .unwrap()
            .insert(key, FakeResponse::Fail(status));
    }

    /// URLs requested so far, in order.
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

impl Default for FakeApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResourceFetcher for FakeApi {
    fn endpoint(&self, path: &str) -> Result<Url, CollectorError> {
        Ok(self.base.join(path.trim_start_matches('/'))?)
    }

    async fn fetch(&self, url: &str) -> Result<Resource, CollectorError> {
        self.fetched.lock().unwrap().push(url.to_string());

        let body = match self.responses.lock().unwrap().get(url) {
            Some(FakeResponse::Page(body)) => body.clone(),
            Some(FakeResponse::Fail(status)) => {
                return Err(CollectorError::Network {
                    status: Some(*status),
                    url: url.to_string(),
                    attempts: 1,
                })
            },
            None => {
                return Err(CollectorError::Network {
                    status: Some(404),
                    url: url.to_string(),
                    attempts: 1,
                })
            },
        };

        Resource::from_body(url, FAKE_CLIENT_ID, body)
    }
}

#[derive(Default)]
struct MemoryState {
    documents: HashMap<Collection, Vec<Document>>,
    upserts: HashMap<Collection, usize>,
    batch_inserts: HashMap<Collection, usize>,
}

/// `DocumentStore` keeping documents in memory and counting write calls.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn documents(&self, collection: Collection) -> Vec<Document> {
        self.state
            .lock()
            .unwrap()
            .documents
            .get(&collection)
            .cloned()
            .unwrap_or_default()
    }

    pub fn upserts(&self, collection: Collection) -> usize {
        self.state.lock().unwrap().upserts.get(&collection).copied().unwrap_or(0)
    }

    pub fn batch_inserts(&self, collection: Collection) -> usize {
        self.state
            .lock()
            .unwrap()
            .batch_inserts
            .get(&collection)
            .copied()
            .unwrap_or(0)
    }

    /// Total write calls of any kind.
    pub fn write_calls(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.upserts.values().sum::<usize>() + state.batch_inserts.values().sum::<usize>()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert_many(&self, collection: Collection, docs: &[Document]) -> anyhow::Result<u64> {
        let mut state = self.state.lock().unwrap();
        *state.batch_inserts.entry(collection).or_insert(0) += 1;

        let stored = state.documents.entry(collection).or_default();
        for doc in docs {
            if stored.iter().any(|existing| existing.id == doc.id) {
                anyhow::bail!("duplicate key {} in {}", doc.id, collection);
            }
            stored.push(doc.clone());
        }
        Ok(docs.len() as u64)
    }

    async fn upsert(&self, collection: Collection, doc: &Document) -> anyhow::Result<()> {
        let mut state = self.state.lock().unwrap();
        *state.upserts.entry(collection).or_insert(0) += 1;

        let stored = state.documents.entry(collection).or_default();
        match stored.iter_mut().find(|existing| existing.id == doc.id) {
            Some(existing) => *existing = doc.clone(),
            None => stored.push(doc.clone()),
        }
        Ok(())
    }
}

/// Request seen by `MockApi`.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub headers: Vec<(String, String)>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Minimal HTTP/1.1 server answering queued responses in order, one per
/// connection.
///
/// Used to exercise the real `ApiClient` (headers, retries, decoding).
pub struct MockApi {
    base_url: String,
    responses: Arc<Mutex<VecDeque<(u16, String)>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockApi {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let responses: Arc<Mutex<VecDeque<(u16, String)>>> = Arc::default();
        let requests: Arc<Mutex<Vec<RecordedRequest>>> = Arc::default();

        let queue = responses.clone();
        let seen = requests.clone();
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };

                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                    }
                }

                let head = String::from_utf8_lossy(&buf).to_string();
                let mut lines = head.split("\r\n");
                let path = lines
                    .next()
                    .and_then(|line| line.split_whitespace().nth(1))
                    .unwrap_or("/")
                    .to_string();
                let headers = lines
                    .take_while(|line| !line.is_empty())
                    .filter_map(|line| line.split_once(':'))
                    .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
                    .collect();
                seen.lock().unwrap().push(RecordedRequest { path, headers });

                let (status, body) = queue
                    .lock()
                    .unwrap()
                    .pop_front()
                    .unwrap_or((404, "{}".to_string()));
                let reason = if status < 400 { "OK" } else { "Error" };
                let response = format!(
                    "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    reason,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        Self {
            base_url: format!("http://{}/", addr),
            responses,
            requests,
        }
    }

    pub fn base_url(&self) -> String {
        self.base_url.clone()
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn push(&self, status: u16, body: Value) {
        self.push_raw(status, &body.to_string());
    }

    pub fn push_raw(&self, status: u16, body: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back((status, body.to_string()));
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}
