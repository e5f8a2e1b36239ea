//! Data managers: typed per-record storage capabilities.
//!
//! # Error kinds
//! Only two kinds cross this boundary. `NotFound` is reported when a row is
//! absent or archived; everything else (constraint violations, pool
//! exhaustion, decode failures) collapses into `Unexpected`.
//!
//! # Scope
//! Every lookup takes the full belongs-to path. A record is never addressed
//! by its leaf id alone when it lives under a parent.
use crate::config::{PantryConfig, StorageBackend};
use crate::filter::{QueryFilter, QueryFilteredResult};
use crate::resource::Record;
use anyhow::Context;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

pub mod memory;
pub mod postgres;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound("row".to_string()),
            other => StoreError::Unexpected(anyhow::Error::new(other)),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::Unexpected(anyhow::Error::new(err))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait DataManager<R: Record>: Send + Sync {
    async fn get(&self, scope: &[String], id: &str) -> StoreResult<R>;
    async fn exists(&self, scope: &[String], id: &str) -> StoreResult<bool>;
    async fn list(&self, scope: &[String], filter: &QueryFilter)
    -> StoreResult<QueryFilteredResult<R>>;
    /// Substring search over each record's search text.
    async fn search(
        &self,
        scope: &[String],
        query: &str,
        filter: &QueryFilter,
    ) -> StoreResult<QueryFilteredResult<R>>;
    /// Live records among `ids`, in the order of `ids`. Missing ids are skipped.
    async fn get_by_ids(&self, scope: &[String], ids: &[String]) -> StoreResult<Vec<R>>;
    async fn create(&self, record: R) -> StoreResult<R>;
    async fn update(&self, record: &R) -> StoreResult<()>;
    async fn archive(&self, scope: &[String], id: &str) -> StoreResult<()>;
}

/// Configured storage backend; hands out typed data managers.
#[derive(Clone)]
pub enum Storage {
    Memory(memory::InMemoryStore),
    Postgres(postgres::PostgresStore),
}

impl Storage {
    pub async fn from_config(config: &PantryConfig) -> anyhow::Result<Self> {
        match config.storage {
            StorageBackend::Memory => Ok(Storage::Memory(memory::InMemoryStore::new())),
            StorageBackend::Postgres => {
                let pg = config
                    .postgres
                    .as_ref()
                    .context("postgres configuration missing")?;
                Ok(Storage::Postgres(postgres::PostgresStore::connect(pg).await?))
            }
        }
    }

    pub fn manager<R: Record>(&self) -> Arc<dyn DataManager<R>> {
        match self {
            Storage::Memory(store) => Arc::new(store.manager::<R>()),
            Storage::Postgres(store) => Arc::new(store.manager::<R>()),
        }
    }

    pub async fn health_check(&self) -> StoreResult<()> {
        match self {
            Storage::Memory(_) => Ok(()),
            Storage::Postgres(store) => store.health_check().await,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            Storage::Memory(_) => "memory",
            Storage::Postgres(_) => "postgres",
        }
    }
}
