//! Meilisearch-backed search index: one index per resource kind, documents
//! keyed by record id.
use super::{SearchError, SearchIndex};
use async_trait::async_trait;
use meilisearch_sdk::client::Client;
use meilisearch_sdk::errors::{Error as MeiliError, ErrorCode};
use pantry_common::ResourceKind;
use serde_json::Value;

const PRIMARY_KEY: &str = "id";

pub struct MeilisearchIndex {
    client: Client,
}

impl MeilisearchIndex {
    pub fn new(url: &str, api_key: Option<&str>) -> anyhow::Result<Self> {
        let client = Client::new(url, api_key)?;
        Ok(Self { client })
    }

    fn index_name(kind: ResourceKind) -> String {
        format!("{}s", kind.as_str())
    }
}

fn map_error(kind: ResourceKind, err: MeiliError) -> SearchError {
    match err {
        MeiliError::Meilisearch(ref inner) if matches!(inner.error_code, ErrorCode::IndexNotFound) => {
            SearchError::NotFound(MeilisearchIndex::index_name(kind))
        }
        other => SearchError::Backend(other.to_string()),
    }
}

#[async_trait]
impl SearchIndex for MeilisearchIndex {
    async fn search(
        &self,
        kind: ResourceKind,
        query: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<String>, SearchError> {
        let index = self.client.index(Self::index_name(kind));
        let results = index
            .search()
            .with_query(query)
            .with_offset(offset)
            .with_limit(limit)
            .execute::<Value>()
            .await
            .map_err(|err| map_error(kind, err))?;
        Ok(results
            .hits
            .into_iter()
            .filter_map(|hit| {
                hit.result
                    .get(PRIMARY_KEY)
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .collect())
    }

    async fn index(&self, kind: ResourceKind, id: &str, document: Value) -> Result<(), SearchError> {
        let mut document = document;
        if let Value::Object(fields) = &mut document {
            fields.insert(PRIMARY_KEY.to_string(), Value::String(id.to_string()));
        }
        self.client
            .index(Self::index_name(kind))
            .add_or_update(&[document], Some(PRIMARY_KEY))
            .await
            .map_err(|err| map_error(kind, err))?;
        Ok(())
    }

    async fn delete(&self, kind: ResourceKind, id: &str) -> Result<(), SearchError> {
        self.client
            .index(Self::index_name(kind))
            .delete_document(id)
            .await
            .map_err(|err| map_error(kind, err))?;
        Ok(())
    }
}
