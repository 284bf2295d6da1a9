pub mod api;
pub mod collector;
pub mod config;
pub mod db;
pub mod error;

#[cfg(test)]
pub(crate) mod test_utils;

pub use api::{ApiClient, Resource, ResourceFetcher};
pub use collector::{Collector, RunReport};
pub use config::Settings;
pub use db::Database;
pub use error::CollectorError;
