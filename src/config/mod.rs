#[allow(clippy::module_inception)]
mod config;

pub use config::{
    ApiSettings, CollectorSettings, FailurePolicy, PassKind, PostgresSettings, Settings,
};
