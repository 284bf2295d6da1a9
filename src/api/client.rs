use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use log::{debug, error, warn};
use reqwest::header::ACCEPT;
use url::Url;

use crate::api::{Resource, ResourceFetcher};
use crate::config::ApiSettings;
use crate::error::CollectorError;

/// Header carrying the registered application name.
pub const CLIENT_ID_HEADER: &str = "Client-ID";

/// Longest response body excerpt written to the log on a failed attempt.
const LOG_BODY_LIMIT: usize = 200;

enum AttemptFailure {
    Status { status: u16, body: String },
    Transport(reqwest::Error),
}

/// HTTP client for the Twitch API.
///
/// Every request carries the configured client id and versioned `Accept`
/// header. Failed attempts are retried after a fixed delay until the retry
/// budget is spent.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    settings: Arc<ApiSettings>,
}

impl ApiClient {
    pub fn new(settings: ApiSettings) -> anyhow::Result<Self> {
        // A base without a trailing slash would drop its last path segment on join
        let mut base = settings.base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url =
            Url::parse(&base).with_context(|| format!("Invalid API base URL: {}", base))?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = settings.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url,
            settings: Arc::new(settings),
        })
    }

    async fn attempt(&self, url: &str) -> Result<Vec<u8>, AttemptFailure> {
        let response = self
            .http
            .get(url)
            .header(CLIENT_ID_HEADER, &self.settings.client_id)
            .header(ACCEPT, &self.settings.accept)
            .send()
            .await
            .map_err(AttemptFailure::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AttemptFailure::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .bytes()
            .await
            .map(|bytes| bytes.to_vec())
            .map_err(AttemptFailure::Transport)
    }
}

fn excerpt(body: &str) -> String {
    let mut out: String = body.chars().take(LOG_BODY_LIMIT).collect();
    if out.len() < body.len() {
        out.push_str("...");
    }
    out
}

#[async_trait]
impl ResourceFetcher for ApiClient {
    fn endpoint(&self, path: &str) -> Result<Url, CollectorError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    async fn fetch(&self, url: &str) -> Result<Resource, CollectorError> {
        let max_attempts = self.settings.max_retries.saturating_add(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            debug!("GET {} (attempt {}/{})", url, attempt, max_attempts);

            let last_status = match self.attempt(url).await {
                Ok(body) => {
                    return Resource::from_bytes(url, self.settings.client_id.as_str(), &body);
                },
                Err(AttemptFailure::Status { status, body }) => {
                    warn!(
                        "GET {} returned HTTP {} (attempt {}/{}): {}",
                        url,
                        status,
                        attempt,
                        max_attempts,
                        excerpt(&body)
                    );
                    Some(status)
                },
                Err(AttemptFailure::Transport(e)) => {
                    warn!(
                        "GET {} failed (attempt {}/{}): {}",
                        url, attempt, max_attempts, e
                    );
                    None
                },
            };

            if attempt >= max_attempts {
                error!(
                    "Giving up on {} after {} attempts (last status: {:?})",
                    url, attempt, last_status
                );
                return Err(CollectorError::Network {
                    status: last_status,
                    url: url.to_string(),
                    attempts: attempt,
                });
            }

            tokio::time::sleep(self.settings.retry_delay()).await;
        }
    }
}
