use std::{fmt, time::Duration};

use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

/// Twitch API access configuration.
///
/// The client id has no default: every deployment identifies itself
/// explicitly.
#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub client_id: String,
    /// Versioned media type sent in the `Accept` header
    #[serde(default = "default_accept")]
    pub accept: String,
    /// Retries after the first failed attempt (fixed delay, no backoff growth)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Unset means no timeout beyond the HTTP client's default
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    "https://api.twitch.tv/kraken/".to_string()
}

fn default_accept() -> String {
    "application/vnd.twitchtv.v2+json".to_string()
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    2_000
}

impl ApiSettings {
    pub fn new(base_url: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client_id: client_id.into(),
            accept: default_accept(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            request_timeout_secs: None,
        }
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// PostgreSQL connection configuration for the document store.
#[derive(Debug, Deserialize, Clone)]
pub struct PostgresSettings {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
    #[serde(default = "default_schema_file")]
    pub schema_file: String,
    /// Connection attempts after the first one before startup fails
    #[serde(default = "default_connect_retries")]
    pub connect_retries: u32,
    #[serde(default = "default_connect_retry_delay_ms")]
    pub connect_retry_delay_ms: u64,
}

impl PostgresSettings {
    pub fn connect_retry_delay(&self) -> Duration {
        Duration::from_millis(self.connect_retry_delay_ms)
    }
}

fn default_port() -> u16 {
    5432
}

fn default_pool_size() -> usize {
    2
}

fn default_schema_file() -> String {
    "schema/postgres.sql".to_string()
}

fn default_connect_retries() -> u32 {
    2
}

fn default_connect_retry_delay_ms() -> u64 {
    1_000
}

/// One collection procedure.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PassKind {
    Summary,
    Channels,
    Games,
}

impl PassKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::Channels => "channels",
            Self::Games => "games",
        }
    }
}

impl fmt::Display for PassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a failed pass does to the rest of the run.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Skip every pass after the first failure
    #[default]
    Abort,
    /// Run the remaining passes anyway; the run still reports failure
    Continue,
}

/// Pass selection, endpoints and paging limits for one run.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CollectorSettings {
    pub passes: Vec<PassKind>,
    pub on_pass_failure: FailurePolicy,
    /// Endpoint paths, relative to `api.base_url`
    pub summary_path: String,
    pub streams_path: String,
    pub games_path: String,
    pub streams_page_size: usize,
    pub games_page_size: usize,
    /// Upper bound on top-games pages per run; unset follows `next` links
    /// until an empty page or the last link
    pub games_max_pages: Option<usize>,
}

impl Default for CollectorSettings {
    fn default() -> Self {
        Self {
            passes: vec![PassKind::Summary, PassKind::Games, PassKind::Channels],
            on_pass_failure: FailurePolicy::Abort,
            summary_path: "streams/summary".to_string(),
            streams_path: "streams".to_string(),
            games_path: "games/top".to_string(),
            streams_page_size: 99,
            games_page_size: 50,
            games_max_pages: None,
        }
    }
}

/// Root application configuration.
///
/// Loaded from `config.{yaml,toml,json}` with `TWITCHSTATS__SECTION__KEY`
/// environment overrides.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub api: ApiSettings,
    pub postgres: PostgresSettings,
    #[serde(default)]
    pub collector: CollectorSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name("config"))
            .add_source(
                Environment::with_prefix("TWITCHSTATS")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("collector.passes"),
            )
            .build()?;

        let settings: Settings = s.try_deserialize()?;
        settings.validate()?;

        Ok(settings)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()?;

        let settings: Settings = s.try_deserialize()?;
        settings.validate()?;

        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.client_id.trim().is_empty() {
            return Err(ConfigError::Message("api.client_id must not be empty".into()));
        }
        if self.collector.passes.is_empty() {
            return Err(ConfigError::Message(
                "collector.passes must name at least one pass".into(),
            ));
        }
        if self.collector.streams_page_size == 0 || self.collector.games_page_size == 0 {
            return Err(ConfigError::Message(
                "collector page sizes must be greater than zero".into(),
            ));
        }
        if self.collector.games_max_pages == Some(0) {
            return Err(ConfigError::Message(
                "collector.games_max_pages must be greater than zero when set".into(),
            ));
        }
        if self.api.request_timeout_secs == Some(0) {
            return Err(ConfigError::Message(
                "api.request_timeout_secs must be greater than zero when set".into(),
            ));
        }
        Ok(())
    }
}
