//! Per-request session context.
//!
//! # Purpose
//! A [`SessionContext`] is the materialized identity of the caller: who they
//! are, what the service lets them do, which household is active and what
//! role they hold in each household. It is attached to the request by the
//! authentication middleware and read (never built) by handlers.
//!
//! # Key invariants
//! - Extraction never touches a store; a missing or mistyped extension is a
//!   plain failure, whatever the underlying cause.
//! - The context is read-only once attached.
use axum::http::Extensions;
use pantry_common::ResourceKind;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Read,
    Write,
    Administer,
}

pub trait PermissionChecker: Send + Sync + fmt::Debug {
    fn can(&self, capability: Capability, kind: ResourceKind) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    ServiceAdmin,
    ServiceUser,
    HouseholdAdmin,
    HouseholdMember,
}

/// Role-based checker used for both service-wide and household permissions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RolePermissions {
    roles: BTreeSet<Role>,
}

impl RolePermissions {
    pub fn new(roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            roles: roles.into_iter().collect(),
        }
    }

    pub fn roles(&self) -> impl Iterator<Item = &Role> {
        self.roles.iter()
    }
}

impl PermissionChecker for RolePermissions {
    fn can(&self, capability: Capability, kind: ResourceKind) -> bool {
        if self.roles.contains(&Role::ServiceAdmin) {
            return true;
        }
        if kind.is_household_owned() {
            return match capability {
                Capability::Read | Capability::Write => self
                    .roles
                    .iter()
                    .any(|role| matches!(role, Role::HouseholdAdmin | Role::HouseholdMember)),
                Capability::Administer => self.roles.contains(&Role::HouseholdAdmin),
            };
        }
        match capability {
            Capability::Read => !self.roles.is_empty(),
            Capability::Write => {
                !kind.is_reference_data() && self.roles.contains(&Role::ServiceUser)
            }
            Capability::Administer => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requester {
    pub user_id: String,
    pub account_status: String,
    #[serde(default)]
    pub account_status_explanation: String,
}

#[derive(Debug, Clone)]
pub struct SessionContext {
    pub requester: Requester,
    pub active_household_id: String,
    pub service_permissions: Arc<dyn PermissionChecker>,
    pub household_permissions: HashMap<String, Arc<dyn PermissionChecker>>,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("session context data is missing from the request")]
pub struct MissingSessionContext;

impl SessionContext {
    pub fn user_id(&self) -> &str {
        &self.requester.user_id
    }

    pub fn household_permissions(&self, household_id: &str) -> Option<&dyn PermissionChecker> {
        self.household_permissions
            .get(household_id)
            .map(|checker| checker.as_ref())
    }

    /// Whether the caller may administer `kind` service-wide.
    pub fn is_service_admin_for(&self, kind: ResourceKind) -> bool {
        self.service_permissions.can(Capability::Administer, kind)
    }

    pub fn from_extensions(extensions: &Extensions) -> Result<Self, MissingSessionContext> {
        extensions
            .get::<SessionContext>()
            .cloned()
            .ok_or(MissingSessionContext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(service: &[Role]) -> SessionContext {
        SessionContext {
            requester: Requester {
                user_id: "u1".to_string(),
                account_status: "good".to_string(),
                account_status_explanation: String::new(),
            },
            active_household_id: "h1".to_string(),
            service_permissions: Arc::new(RolePermissions::new(service.iter().copied())),
            household_permissions: HashMap::from([(
                "h1".to_string(),
                Arc::new(RolePermissions::new([Role::HouseholdMember])) as Arc<dyn PermissionChecker>,
            )]),
        }
    }

    #[test]
    fn extraction_requires_the_extension() {
        let mut extensions = Extensions::new();
        assert_eq!(
            SessionContext::from_extensions(&extensions).unwrap_err(),
            MissingSessionContext
        );
        extensions.insert(session(&[Role::ServiceUser]));
        let found = SessionContext::from_extensions(&extensions).expect("session");
        assert_eq!(found.user_id(), "u1");
    }

    #[test]
    fn extraction_ignores_wrongly_typed_values() {
        let mut extensions = Extensions::new();
        extensions.insert("u1".to_string());
        assert!(SessionContext::from_extensions(&extensions).is_err());
    }

    #[test]
    fn service_roles_gate_reference_data() {
        let user = RolePermissions::new([Role::ServiceUser]);
        assert!(user.can(Capability::Read, ResourceKind::ServiceSetting));
        assert!(!user.can(Capability::Write, ResourceKind::ServiceSetting));
        assert!(user.can(Capability::Write, ResourceKind::Recipe));
        assert!(!user.can(Capability::Administer, ResourceKind::Recipe));

        let admin = RolePermissions::new([Role::ServiceAdmin]);
        assert!(admin.can(Capability::Administer, ResourceKind::ServiceSetting));
    }

    #[test]
    fn household_roles_gate_household_kinds() {
        let caller = session(&[Role::ServiceUser]);
        let household = caller.household_permissions("h1").expect("h1");
        assert!(household.can(Capability::Write, ResourceKind::MealPlan));
        assert!(!household.can(Capability::Administer, ResourceKind::MealPlan));
        assert!(caller.household_permissions("h2").is_none());
        assert!(!caller.is_service_admin_for(ResourceKind::MealPlan));
    }
}
