//! Entity tables.
//!
//! Each submodule describes one entity: the persisted record, its creation
//! and update inputs with their validation rules, and a marker type that
//! implements [`crate::resource::Resource`]. Handlers are never written here.

/// Accessors every record shares; records keep `id` and a flattened `lifecycle`.
macro_rules! record_accessors {
    () => {
        fn id(&self) -> &str {
            &self.id
        }

        fn lifecycle(&self) -> &$crate::resource::Lifecycle {
            &self.lifecycle
        }

        fn lifecycle_mut(&mut self) -> &mut $crate::resource::Lifecycle {
            &mut self.lifecycle
        }
    };
}

pub mod household_instrument_ownership;
pub mod meal_plan;
pub mod meal_plan_option;
pub mod meal_plan_option_vote;
pub mod recipe;
pub mod recipe_step;
pub mod service_setting;
pub mod service_setting_configuration;
pub mod valid_instrument;
pub mod valid_measurement_unit;
pub mod valid_preparation;
pub mod webhook;

/// Overwrites `target` when the update carries a value.
pub(crate) fn assign<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}

/// Like [`assign`], for optional record fields.
pub(crate) fn assign_some<T>(target: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *target = value;
    }
}

/// Joins the non-empty parts a record is searched by.
pub(crate) fn search_text<'a>(parts: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let joined = parts
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    (!joined.is_empty()).then_some(joined)
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::auth::session::{PermissionChecker, Requester, Role, RolePermissions, SessionContext};
    use std::collections::HashMap;
    use std::sync::Arc;

    pub fn session() -> SessionContext {
        SessionContext {
            requester: Requester {
                user_id: "user-1".to_string(),
                account_status: "good".to_string(),
                account_status_explanation: String::new(),
            },
            active_household_id: "household-1".to_string(),
            service_permissions: Arc::new(RolePermissions::new([Role::ServiceUser])),
            household_permissions: HashMap::from([(
                "household-1".to_string(),
                Arc::new(RolePermissions::new([Role::HouseholdAdmin])) as Arc<dyn PermissionChecker>,
            )]),
        }
    }
}
