//! In-memory data managers.
//!
//! # Purpose
//! Each record type gets its own table (a `HashMap` behind a
//! `tokio::sync::RwLock`) keyed by scope path and id. Tables are shared by
//! every manager handed out by the same [`InMemoryStore`]. Used for local
//! development and tests.
//!
//! # Durability and consistency
//! - **Not durable**: all state is lost on process restart.
//! - **Single-process consistency**: write locks for mutations, read locks
//!   for reads; last writer wins on concurrent updates.
use super::{DataManager, StoreError, StoreResult};
use crate::filter::{QueryFilter, QueryFilteredResult, SortDirection, SortField};
use crate::resource::Record;
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

type RowKey = (Vec<String>, String);
type Table<R> = RwLock<HashMap<RowKey, R>>;

#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<DashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn manager<R: Record>(&self) -> InMemoryDataManager<R> {
        let shared = self
            .tables
            .entry(TypeId::of::<R>())
            .or_insert_with(|| -> Arc<dyn Any + Send + Sync> { Arc::new(Table::<R>::default()) })
            .value()
            .clone();
        let table = match shared.downcast::<Table<R>>() {
            Ok(table) => table,
            Err(_) => {
                tracing::error!(table = R::TABLE, "in-memory table type mismatch");
                Arc::new(Table::<R>::default())
            }
        };
        InMemoryDataManager { table }
    }
}

pub struct InMemoryDataManager<R: Record> {
    table: Arc<Table<R>>,
}

impl<R: Record> InMemoryDataManager<R> {
    async fn select(
        &self,
        scope: &[String],
        filter: &QueryFilter,
        matches: impl Fn(&R) -> bool,
    ) -> QueryFilteredResult<R> {
        let rows = self.table.read().await;
        let mut selected: Vec<R> = rows
            .iter()
            .filter(|((row_scope, _), record)| {
                let lifecycle = record.lifecycle();
                row_scope.as_slice() == scope
                    && (filter.include_archived || !lifecycle.is_archived())
                    && filter.admits(lifecycle.created_at, lifecycle.last_updated_at)
                    && matches(record)
            })
            .map(|(_, record)| record.clone())
            .collect();
        drop(rows);

        selected.sort_by(|a, b| {
            let ordering = match filter.sort_field {
                SortField::CreatedAt => a.lifecycle().created_at.cmp(&b.lifecycle().created_at),
                SortField::LastUpdatedAt => a
                    .lifecycle()
                    .last_updated_at
                    .cmp(&b.lifecycle().last_updated_at),
            }
            .then_with(|| a.id().cmp(b.id()));
            match filter.sort_direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });

        let total = selected.len() as u64;
        let data = selected
            .into_iter()
            .skip(filter.offset() as usize)
            .take(usize::from(filter.limit))
            .collect();
        QueryFilteredResult {
            data,
            pagination: filter.to_pagination_with_total(total),
        }
    }
}

#[async_trait]
impl<R: Record> DataManager<R> for InMemoryDataManager<R> {
    async fn get(&self, scope: &[String], id: &str) -> StoreResult<R> {
        let rows = self.table.read().await;
        rows.get(&(scope.to_vec(), id.to_string()))
            .filter(|record| !record.lifecycle().is_archived())
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("{} {id}", R::TABLE)))
    }

    async fn exists(&self, scope: &[String], id: &str) -> StoreResult<bool> {
        let rows = self.table.read().await;
        Ok(rows
            .get(&(scope.to_vec(), id.to_string()))
            .is_some_and(|record| !record.lifecycle().is_archived()))
    }

    async fn list(
        &self,
        scope: &[String],
        filter: &QueryFilter,
    ) -> StoreResult<QueryFilteredResult<R>> {
        Ok(self.select(scope, filter, |_| true).await)
    }

    async fn search(
        &self,
        scope: &[String],
        query: &str,
        filter: &QueryFilter,
    ) -> StoreResult<QueryFilteredResult<R>> {
        let needle = query.to_lowercase();
        Ok(self
            .select(scope, filter, |record| {
                record
                    .search_text()
                    .is_some_and(|text| text.to_lowercase().contains(&needle))
            })
            .await)
    }

    async fn get_by_ids(&self, scope: &[String], ids: &[String]) -> StoreResult<Vec<R>> {
        let rows = self.table.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| rows.get(&(scope.to_vec(), id.clone())))
            .filter(|record| !record.lifecycle().is_archived())
            .cloned()
            .collect())
    }

    async fn create(&self, record: R) -> StoreResult<R> {
        let key = (record.scope_path(), record.id().to_string());
        let mut rows = self.table.write().await;
        if rows.contains_key(&key) {
            return Err(StoreError::Unexpected(anyhow::anyhow!(
                "duplicate {} id {}",
                R::TABLE,
                record.id()
            )));
        }
        rows.insert(key, record.clone());
        metrics::counter!("pantry_records_mutations_total", "table" => R::TABLE, "op" => "created")
            .increment(1);
        Ok(record)
    }

    async fn update(&self, record: &R) -> StoreResult<()> {
        let key = (record.scope_path(), record.id().to_string());
        let mut rows = self.table.write().await;
        match rows.get_mut(&key) {
            Some(existing) if !existing.lifecycle().is_archived() => {
                *existing = record.clone();
                metrics::counter!("pantry_records_mutations_total", "table" => R::TABLE, "op" => "updated")
                    .increment(1);
                Ok(())
            }
            _ => Err(StoreError::NotFound(format!("{} {}", R::TABLE, record.id()))),
        }
    }

    async fn archive(&self, scope: &[String], id: &str) -> StoreResult<()> {
        let mut rows = self.table.write().await;
        match rows.get_mut(&(scope.to_vec(), id.to_string())) {
            Some(existing) if !existing.lifecycle().is_archived() => {
                existing.lifecycle_mut().archived_at = Some(Utc::now());
                metrics::counter!("pantry_records_mutations_total", "table" => R::TABLE, "op" => "archived")
                    .increment(1);
                Ok(())
            }
            _ => Err(StoreError::NotFound(format!("{} {id}", R::TABLE))),
        }
    }
}
