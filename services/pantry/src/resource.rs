//! Record and resource descriptions shared by storage and the HTTP layer.
//!
//! A [`Record`] is what gets persisted: an id, lifecycle timestamps and a
//! belongs-to scope path. A [`Resource`] describes how a record is exposed
//! over HTTP: its routes, its creation and update inputs, and how those
//! inputs turn into records. Each entity in `model` is one `Resource` impl;
//! the handler pipeline is written once against this trait.
use crate::auth::session::SessionContext;
use crate::validation::{Validate, Violation};
use chrono::{DateTime, Utc};
use pantry_common::ResourceKind;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// Timestamps every persisted record carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Lifecycle {
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub archived_at: Option<DateTime<Utc>>,
}

impl Lifecycle {
    pub fn created_now() -> Self {
        Self {
            created_at: Utc::now(),
            last_updated_at: None,
            archived_at: None,
        }
    }

    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }
}

pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Backing table; must be one of the tables created by the migrations.
    const TABLE: &'static str;

    fn id(&self) -> &str;
    fn lifecycle(&self) -> &Lifecycle;
    fn lifecycle_mut(&mut self) -> &mut Lifecycle;

    /// Parent ids from outermost to innermost. Lookups match this exactly.
    fn scope_path(&self) -> Vec<String>;

    /// Text matched by database search. `None` for records without search.
    fn search_text(&self) -> Option<String> {
        None
    }
}

/// Belongs-to path of a request: the active household (for household-owned
/// resources) followed by the parent ids taken from the URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    household_id: Option<String>,
    parents: Vec<(&'static str, String)>,
}

impl Scope {
    pub fn new(household_id: Option<String>, parents: Vec<(&'static str, String)>) -> Self {
        Self {
            household_id,
            parents,
        }
    }

    pub fn unscoped() -> Self {
        Self::default()
    }

    pub fn household_id(&self) -> Option<&str> {
        self.household_id.as_deref()
    }

    /// Value of a parent path parameter, empty when the resource has none.
    pub fn parent(&self, name: &str) -> &str {
        self.parents
            .iter()
            .find(|(param, _)| *param == name)
            .map(|(_, value)| value.as_str())
            .unwrap_or_default()
    }

    /// Flattened path the store keys records under.
    pub fn path(&self) -> Vec<String> {
        self.household_id
            .iter()
            .cloned()
            .chain(self.parents.iter().map(|(_, value)| value.clone()))
            .collect()
    }

    /// Scope as named fields for data-change messages.
    pub fn fields(&self) -> BTreeMap<String, String> {
        self.parents
            .iter()
            .map(|(param, value)| (param.to_string(), value.clone()))
            .collect()
    }
}

pub trait Resource: Send + Sync + 'static {
    type Record: Record;
    type CreateInput: DeserializeOwned + Validate + Send + 'static;
    type UpdateInput: DeserializeOwned + Validate + Send + 'static;

    const KIND: ResourceKind;
    /// Collection route relative to the API prefix, e.g. `/recipes/:recipeID/steps`.
    const COLLECTION_PATH: &'static str;
    /// Name of the path parameter holding the record id.
    const ID_PARAM: &'static str;
    /// Names of parent path parameters, outermost first.
    const PARENT_PARAMS: &'static [&'static str] = &[];
    const HOUSEHOLD_SCOPED: bool = false;
    const SEARCHABLE: bool = false;

    /// Builds a record from a validated creation input. `id` is already assigned.
    fn create(
        id: String,
        input: Self::CreateInput,
        scope: &Scope,
        session: &SessionContext,
    ) -> Self::Record;

    /// Applies a validated update input; absent fields leave the record untouched.
    fn update(record: &mut Self::Record, input: Self::UpdateInput);

    /// Rules spanning several fields, checked on the record about to be
    /// written. Create and update both run it, so an update cannot produce a
    /// record that create would reject.
    fn check(_record: &Self::Record) -> Result<(), Violation> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_path_puts_household_first() {
        let scope = Scope::new(
            Some("h1".to_string()),
            vec![("mealPlanID", "mp1".to_string()), ("mealPlanOptionID", "o1".to_string())],
        );
        assert_eq!(scope.path(), vec!["h1", "mp1", "o1"]);
        assert_eq!(scope.parent("mealPlanOptionID"), "o1");
        assert_eq!(scope.parent("recipeID"), "");
        assert_eq!(scope.household_id(), Some("h1"));
        assert_eq!(scope.fields().len(), 2);
    }

    #[test]
    fn unscoped_scope_is_empty() {
        let scope = Scope::unscoped();
        assert!(scope.path().is_empty());
        assert!(scope.fields().is_empty());
        assert_eq!(scope.household_id(), None);
    }
}
