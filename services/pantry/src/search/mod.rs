//! Free-text search with an optional external index.
//!
//! # Purpose
//! A [`SearchIndex`] maps a query to an ordered list of record ids. When one
//! is configured and the caller did not ask for the database, ids come from
//! the index and records are loaded with `get_by_ids`, preserving the
//! index's ranking. Otherwise the data manager's own `search` runs.
//!
//! # Consistency
//! The index is eventually consistent with the database. Stale hits are
//! harmless: `get_by_ids` skips archived and missing records. Pages are cut
//! from the hits that survive that check, so the index is read in batches
//! until the requested page is full or the index runs out.
use crate::config::SearchConfig;
use crate::filter::{QueryFilter, QueryFilteredResult};
use crate::resource::Record;
use crate::store::{DataManager, StoreError, StoreResult};
use anyhow::{Context, anyhow};
use async_trait::async_trait;
use pantry_common::ResourceKind;
use std::sync::Arc;
use thiserror::Error;

pub mod meilisearch;
pub mod memory;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search index not found: {0}")]
    NotFound(String),
    #[error("search backend: {0}")]
    Backend(String),
}

#[async_trait]
pub trait SearchIndex: Send + Sync {
    async fn search(
        &self,
        kind: ResourceKind,
        query: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<String>, SearchError>;
    async fn index(
        &self,
        kind: ResourceKind,
        id: &str,
        document: serde_json::Value,
    ) -> Result<(), SearchError>;
    async fn delete(&self, kind: ResourceKind, id: &str) -> Result<(), SearchError>;
}

impl From<SearchError> for StoreError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::NotFound(what) => StoreError::NotFound(what),
            SearchError::Backend(message) => StoreError::Unexpected(anyhow!(message)),
        }
    }
}

/// Hits requested from the index per round trip, at least one page.
pub const INDEX_BATCH: usize = 100;

/// Runs a search through the index when enabled, otherwise through the store.
pub async fn search_records<R: Record>(
    store: &dyn DataManager<R>,
    index: Option<&dyn SearchIndex>,
    kind: ResourceKind,
    scope: &[String],
    query: &str,
    filter: &QueryFilter,
) -> StoreResult<QueryFilteredResult<R>> {
    match index {
        Some(index) if !filter.use_database => {
            let limit = usize::from(filter.limit);
            let skip = usize::try_from(filter.offset()).unwrap_or(usize::MAX);
            let wanted = skip.saturating_add(limit);
            let batch = limit.max(INDEX_BATCH);

            let mut visible = Vec::new();
            let mut cursor = 0;
            let exhausted = loop {
                let ids = index.search(kind, query, cursor, batch).await?;
                let fetched = ids.len();
                cursor += fetched;
                visible.extend(store.get_by_ids(scope, &ids).await?);
                if fetched < batch {
                    break true;
                }
                if visible.len() > wanted {
                    break false;
                }
            };

            let pagination = if exhausted {
                filter.to_pagination_with_total(visible.len() as u64)
            } else {
                filter.to_pagination()
            };
            let data = visible.into_iter().skip(skip).take(limit).collect();
            Ok(QueryFilteredResult { data, pagination })
        }
        _ => store.search(scope, query, filter).await,
    }
}

pub fn from_config(config: &SearchConfig) -> anyhow::Result<Option<Arc<dyn SearchIndex>>> {
    if !config.use_search_service {
        return Ok(None);
    }
    let url = config
        .meilisearch_url
        .as_deref()
        .context("search service enabled without a meilisearch url")?;
    let index = meilisearch::MeilisearchIndex::new(url, config.meilisearch_api_key.as_deref())?;
    Ok(Some(Arc::new(index)))
}
