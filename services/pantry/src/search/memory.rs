use super::{SearchError, SearchIndex};
use async_trait::async_trait;
use dashmap::DashMap;
use pantry_common::ResourceKind;
use serde_json::Value;

/// Process-local index: every string value of a document is searchable.
#[derive(Debug, Default)]
pub struct MemorySearchIndex {
    documents: DashMap<(ResourceKind, String), String>,
}

impl MemorySearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

fn collect_text(value: &Value, out: &mut String) {
    match value {
        Value::String(text) => {
            out.push_str(&text.to_lowercase());
            out.push('\n');
        }
        Value::Array(items) => items.iter().for_each(|item| collect_text(item, out)),
        Value::Object(fields) => fields.values().for_each(|field| collect_text(field, out)),
        _ => {}
    }
}

#[async_trait]
impl SearchIndex for MemorySearchIndex {
    async fn search(
        &self,
        kind: ResourceKind,
        query: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<String>, SearchError> {
        let terms: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
        let mut ids: Vec<String> = self
            .documents
            .iter()
            .filter(|entry| entry.key().0 == kind)
            .filter(|entry| terms.iter().all(|term| entry.value().contains(term.as_str())))
            .map(|entry| entry.key().1.clone())
            .collect();
        ids.sort();
        Ok(ids.into_iter().skip(offset).take(limit).collect())
    }

    async fn index(&self, kind: ResourceKind, id: &str, document: Value) -> Result<(), SearchError> {
        let mut text = String::new();
        collect_text(&document, &mut text);
        self.documents.insert((kind, id.to_string()), text);
        Ok(())
    }

    async fn delete(&self, kind: ResourceKind, id: &str) -> Result<(), SearchError> {
        self.documents.remove(&(kind, id.to_string()));
        Ok(())
    }
}
