//! Paginated access to the Twitch API.

use async_trait::async_trait;
use url::Url;

use crate::error::CollectorError;

pub mod client;
pub mod resource;

pub use client::ApiClient;
pub use resource::Resource;

/// Source of API pages.
///
/// `ApiClient` is the production implementation; collection passes only
/// depend on this trait.
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    /// Resolves a path relative to the configured API base URL.
    fn endpoint(&self, path: &str) -> Result<Url, CollectorError>;

    /// Fetches one page, retrying transient failures internally.
    async fn fetch(&self, url: &str) -> Result<Resource, CollectorError>;

    /// Fetches the page behind `resource`'s `next` link as a new `Resource`.
    async fn fetch_next(&self, resource: &Resource) -> Result<Resource, CollectorError> {
        match resource.next_url() {
            Some(next) => self.fetch(next).await,
            None => Err(CollectorError::NoNextPage {
                url: resource.url.clone(),
            }),
        }
    }
}
