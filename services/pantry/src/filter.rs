//! Query filter parsing for list and search endpoints.
//!
//! Recognized parameters: `page`, `limit`, `sortBy`, `orderBy`,
//! `createdBefore`, `createdAfter`, `updatedBefore`, `updatedAfter`,
//! `q`/`search`, `useDB` and `includeArchived`. Anything else is ignored and
//! malformed values fall back to their defaults instead of failing.
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u16 = 20;
pub const MAX_LIMIT: u16 = 250;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

/// Columns a listing may be ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    CreatedAt,
    LastUpdatedAt,
}

impl SortField {
    pub fn column(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::LastUpdatedAt => "last_updated_at",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryFilter {
    pub page: u32,
    pub limit: u16,
    pub sort_direction: SortDirection,
    pub sort_field: SortField,
    pub created_before: Option<DateTime<Utc>>,
    pub created_after: Option<DateTime<Utc>>,
    pub updated_before: Option<DateTime<Utc>>,
    pub updated_after: Option<DateTime<Utc>>,
    pub query: Option<String>,
    pub use_database: bool,
    pub include_archived: bool,
}

impl Default for QueryFilter {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            sort_direction: SortDirection::default(),
            sort_field: SortField::default(),
            created_before: None,
            created_after: None,
            updated_before: None,
            updated_after: None,
            query: None,
            use_database: false,
            include_archived: false,
        }
    }
}

/// Pagination block attached to list and search responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,
}

/// A page of records together with its pagination block.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryFilteredResult<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

impl<T> QueryFilteredResult<T> {
    pub fn empty(filter: &QueryFilter) -> Self {
        Self {
            data: Vec::new(),
            pagination: filter.to_pagination(),
        }
    }
}

impl QueryFilter {
    /// Parses a raw query string (without the leading `?`).
    pub fn from_query(raw: Option<&str>) -> Self {
        let pairs: Vec<(String, String)> = raw
            .and_then(|raw| serde_urlencoded::from_str(raw).ok())
            .unwrap_or_default();
        let lookup = |key: &str| first_value(&pairs, key);

        let mut filter = Self::default();
        if let Some(page) = lookup("page").and_then(|v| v.parse::<u32>().ok()) {
            filter.page = page.max(1);
        }
        if let Some(limit) = lookup("limit").and_then(|v| v.parse::<i64>().ok()) {
            filter.limit = limit.clamp(1, i64::from(MAX_LIMIT)) as u16;
        }
        if let Some(direction) = lookup("sortBy") {
            if direction.eq_ignore_ascii_case("desc") {
                filter.sort_direction = SortDirection::Descending;
            }
        }
        if let Some(field) = lookup("orderBy") {
            if field == "lastUpdatedAt" || field == "last_updated_at" {
                filter.sort_field = SortField::LastUpdatedAt;
            }
        }
        filter.created_before = lookup("createdBefore").and_then(parse_timestamp);
        filter.created_after = lookup("createdAfter").and_then(parse_timestamp);
        filter.updated_before = lookup("updatedBefore").and_then(parse_timestamp);
        filter.updated_after = lookup("updatedAfter").and_then(parse_timestamp);
        filter.query = lookup("q")
            .or_else(|| lookup("search"))
            .filter(|q| !q.is_empty())
            .map(str::to_string);
        filter.use_database = lookup("useDB").is_some_and(is_truthy);
        filter.include_archived = lookup("includeArchived").is_some_and(is_truthy);
        filter
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }

    pub fn to_pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            limit: self.limit,
            total_count: None,
        }
    }

    pub fn to_pagination_with_total(&self, total: u64) -> Pagination {
        Pagination {
            total_count: Some(total),
            ..self.to_pagination()
        }
    }

    /// Whether a record with these timestamps passes the time bounds.
    pub fn admits(
        &self,
        created_at: DateTime<Utc>,
        last_updated_at: Option<DateTime<Utc>>,
    ) -> bool {
        if self.created_before.is_some_and(|bound| created_at >= bound) {
            return false;
        }
        if self.created_after.is_some_and(|bound| created_at <= bound) {
            return false;
        }
        if let Some(bound) = self.updated_before {
            if !last_updated_at.is_some_and(|updated| updated < bound) {
                return false;
            }
        }
        if let Some(bound) = self.updated_after {
            if !last_updated_at.is_some_and(|updated| updated > bound) {
                return false;
            }
        }
        true
    }
}

fn first_value<'p>(pairs: &'p [(String, String)], key: &str) -> Option<&'p str> {
    pairs
        .iter()
        .find(|(name, _)| name == key)
        .map(|(_, value)| value.trim())
}

fn is_truthy(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "true" | "1" | "yes")
}

// RFC 3339 or integer unix seconds.
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(seconds) = value.parse::<i64>() {
        return Utc.timestamp_opt(seconds, 0).single();
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}
