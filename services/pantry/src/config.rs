//! Service configuration.
//!
//! Values are read once at startup from `PANTRY_*` environment variables and
//! may be overridden by a YAML file named by `PANTRY_CONFIG`. Nothing is
//! reloaded at runtime; a change requires a restart.
use crate::api::codec::Encoding;
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;

pub const DEFAULT_TOPIC_NAME: &str = "data_changes";
pub const DEFAULT_SESSION_COOKIE_NAME: &str = "pantry_session";
pub const DEFAULT_SESSION_ISSUER: &str = "pantry";
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublisherBackend {
    Noop,
    Memory,
    Nats,
}

#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout_ms: u64,
    pub acquire_timeout_ms: u64,
}

#[derive(Debug, Clone)]
pub struct EventsConfig {
    pub data_changes_topic_name: String,
    pub publisher: PublisherBackend,
    pub nats_url: Option<String>,
    pub encoding: Encoding,
}

#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub use_search_service: bool,
    pub meilisearch_url: Option<String>,
    pub meilisearch_api_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub signing_secret: String,
    pub issuer: String,
}

#[derive(Debug, Clone)]
pub struct PantryConfig {
    pub bind_addr: SocketAddr,
    pub metrics_bind: SocketAddr,
    pub storage: StorageBackend,
    pub postgres: Option<PostgresConfig>,
    pub events: EventsConfig,
    pub search: SearchConfig,
    pub session: SessionConfig,
    pub default_encoding: Encoding,
    pub max_body_bytes: usize,
}

#[derive(Debug, Default, Deserialize)]
struct PantryConfigOverride {
    bind_addr: Option<String>,
    metrics_bind: Option<String>,
    storage: Option<String>,
    database_url: Option<String>,
    database_max_connections: Option<u32>,
    data_changes_topic_name: Option<String>,
    publisher: Option<String>,
    nats_url: Option<String>,
    event_encoding: Option<String>,
    use_search_service: Option<bool>,
    meilisearch_url: Option<String>,
    meilisearch_api_key: Option<String>,
    session_cookie_name: Option<String>,
    session_signing_secret: Option<String>,
    session_issuer: Option<String>,
    default_encoding: Option<String>,
    max_body_bytes: Option<usize>,
}

impl PantryConfig {
    pub fn from_env() -> Result<Self> {
        let bind_addr = env_or("PANTRY_BIND", "0.0.0.0:8000")
            .parse()
            .with_context(|| "parse PANTRY_BIND")?;
        let metrics_bind = env_or("PANTRY_METRICS_BIND", "0.0.0.0:9090")
            .parse()
            .with_context(|| "parse PANTRY_METRICS_BIND")?;
        let storage = parse_storage(&env_or("PANTRY_STORAGE", "memory"))?;
        let postgres = match std::env::var("PANTRY_DATABASE_URL") {
            Ok(url) => Some(PostgresConfig {
                url,
                max_connections: env_parse("PANTRY_DATABASE_MAX_CONNECTIONS", 10)?,
                connect_timeout_ms: env_parse("PANTRY_DATABASE_CONNECT_TIMEOUT_MS", 5_000)?,
                acquire_timeout_ms: env_parse("PANTRY_DATABASE_ACQUIRE_TIMEOUT_MS", 5_000)?,
            }),
            Err(_) => None,
        };
        let events = EventsConfig {
            data_changes_topic_name: env_or("PANTRY_DATA_CHANGES_TOPIC_NAME", DEFAULT_TOPIC_NAME),
            publisher: parse_publisher(&env_or("PANTRY_PUBLISHER", "noop"))?,
            nats_url: std::env::var("PANTRY_NATS_URL").ok(),
            encoding: parse_encoding(&env_or("PANTRY_EVENT_ENCODING", "json"))?,
        };
        let search = SearchConfig {
            use_search_service: env_parse("PANTRY_USE_SEARCH_SERVICE", false)?,
            meilisearch_url: std::env::var("PANTRY_MEILISEARCH_URL").ok(),
            meilisearch_api_key: std::env::var("PANTRY_MEILISEARCH_API_KEY").ok(),
        };
        let session = SessionConfig {
            cookie_name: env_or("PANTRY_SESSION_COOKIE_NAME", DEFAULT_SESSION_COOKIE_NAME),
            signing_secret: std::env::var("PANTRY_SESSION_SECRET").unwrap_or_default(),
            issuer: env_or("PANTRY_SESSION_ISSUER", DEFAULT_SESSION_ISSUER),
        };
        Ok(Self {
            bind_addr,
            metrics_bind,
            storage,
            postgres,
            events,
            search,
            session,
            default_encoding: parse_encoding(&env_or("PANTRY_DEFAULT_ENCODING", "json"))?,
            max_body_bytes: env_parse("PANTRY_MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES)?,
        })
    }

    pub fn from_env_or_yaml() -> Result<Self> {
        let mut config = Self::from_env()?;
        if let Ok(path) = std::env::var("PANTRY_CONFIG") {
            let contents =
                fs::read_to_string(&path).with_context(|| format!("read PANTRY_CONFIG: {path}"))?;
            config.apply_yaml(&contents)?;
        }
        config.check()?;
        Ok(config)
    }

    fn apply_yaml(&mut self, contents: &str) -> Result<()> {
        let overrides: PantryConfigOverride =
            serde_yaml::from_str(contents).with_context(|| "parse pantry config yaml")?;
        if let Some(value) = overrides.bind_addr {
            self.bind_addr = value.parse().with_context(|| "parse bind_addr")?;
        }
        if let Some(value) = overrides.metrics_bind {
            self.metrics_bind = value.parse().with_context(|| "parse metrics_bind")?;
        }
        if let Some(value) = overrides.storage {
            self.storage = parse_storage(&value)?;
        }
        if let Some(url) = overrides.database_url {
            let pg = self.postgres.get_or_insert_with(|| PostgresConfig {
                url: String::new(),
                max_connections: 10,
                connect_timeout_ms: 5_000,
                acquire_timeout_ms: 5_000,
            });
            pg.url = url;
        }
        if let (Some(max), Some(pg)) = (overrides.database_max_connections, self.postgres.as_mut()) {
            pg.max_connections = max;
        }
        if let Some(value) = overrides.data_changes_topic_name {
            self.events.data_changes_topic_name = value;
        }
        if let Some(value) = overrides.publisher {
            self.events.publisher = parse_publisher(&value)?;
        }
        if let Some(value) = overrides.nats_url {
            self.events.nats_url = Some(value);
        }
        if let Some(value) = overrides.event_encoding {
            self.events.encoding = parse_encoding(&value)?;
        }
        if let Some(value) = overrides.use_search_service {
            self.search.use_search_service = value;
        }
        if let Some(value) = overrides.meilisearch_url {
            self.search.meilisearch_url = Some(value);
        }
        if let Some(value) = overrides.meilisearch_api_key {
            self.search.meilisearch_api_key = Some(value);
        }
        if let Some(value) = overrides.session_cookie_name {
            self.session.cookie_name = value;
        }
        if let Some(value) = overrides.session_signing_secret {
            self.session.signing_secret = value;
        }
        if let Some(value) = overrides.session_issuer {
            self.session.issuer = value;
        }
        if let Some(value) = overrides.default_encoding {
            self.default_encoding = parse_encoding(&value)?;
        }
        if let Some(value) = overrides.max_body_bytes {
            self.max_body_bytes = value;
        }
        Ok(())
    }

    fn check(&self) -> Result<()> {
        if self.events.data_changes_topic_name.trim().is_empty() {
            bail!("data_changes_topic_name must not be empty");
        }
        if self.events.publisher == PublisherBackend::Nats && self.events.nats_url.is_none() {
            bail!("nats publisher selected but PANTRY_NATS_URL is not set");
        }
        if self.search.use_search_service && self.search.meilisearch_url.is_none() {
            bail!("use_search_service is enabled but PANTRY_MEILISEARCH_URL is not set");
        }
        if self.session.signing_secret.len() < 16 {
            bail!("session signing secret must be at least 16 bytes");
        }
        Ok(())
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().with_context(|| format!("parse {key}")),
        Err(_) => Ok(default),
    }
}

fn parse_storage(value: &str) -> Result<StorageBackend> {
    match value.trim().to_ascii_lowercase().as_str() {
        "memory" => Ok(StorageBackend::Memory),
        "postgres" => Ok(StorageBackend::Postgres),
        other => bail!("unknown storage backend: {other}"),
    }
}

fn parse_publisher(value: &str) -> Result<PublisherBackend> {
    match value.trim().to_ascii_lowercase().as_str() {
        "noop" => Ok(PublisherBackend::Noop),
        "memory" => Ok(PublisherBackend::Memory),
        "nats" => Ok(PublisherBackend::Nats),
        other => bail!("unknown publisher backend: {other}"),
    }
}

fn parse_encoding(value: &str) -> Result<Encoding> {
    match value.trim().to_ascii_lowercase().as_str() {
        "json" => Ok(Encoding::Json),
        "yaml" => Ok(Encoding::Yaml),
        other => bail!("unknown encoding: {other}"),
    }
}
