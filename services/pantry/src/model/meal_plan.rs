//! Household meal plans. Options and votes hang off a plan.
use crate::auth::session::SessionContext;
use crate::resource::{Lifecycle, Record, Resource, Scope};
use crate::validation::{Rules, Validate, Violation};
use chrono::{DateTime, Utc};
use pantry_common::ResourceKind;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const ELECTION_METHODS: &[&str] = &["schulze", "instant-runoff"];
pub const STATUSES: &[&str] = &["awaiting_votes", "finalized"];
const INITIAL_STATUS: &str = "awaiting_votes";
const DEFAULT_ELECTION_METHOD: &str = "schulze";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MealPlan {
    pub id: String,
    pub notes: String,
    pub status: String,
    pub voting_deadline: DateTime<Utc>,
    pub election_method: String,
    pub belongs_to_household: String,
    pub created_by_user: String,
    #[serde(flatten)]
    pub lifecycle: Lifecycle,
}

impl Record for MealPlan {
    const TABLE: &'static str = "meal_plans";

    record_accessors!();

    fn scope_path(&self) -> Vec<String> {
        vec![self.belongs_to_household.clone()]
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct MealPlanCreationInput {
    pub notes: String,
    pub voting_deadline: Option<DateTime<Utc>>,
    pub election_method: Option<String>,
}

impl Validate for MealPlanCreationInput {
    fn validate(&self) -> Result<(), Violation> {
        Rules::new()
            .ensure(
                "votingDeadline",
                self.voting_deadline.is_some(),
                "cannot be blank",
            )
            .one_of("electionMethod", &self.election_method, ELECTION_METHODS)
            .length("notes", &self.notes, 0, 4096)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct MealPlanUpdateInput {
    pub notes: Option<String>,
    pub status: Option<String>,
    pub voting_deadline: Option<DateTime<Utc>>,
}

impl Validate for MealPlanUpdateInput {
    fn validate(&self) -> Result<(), Violation> {
        Rules::new()
            .at_least_one(&[
                self.notes.is_some(),
                self.status.is_some(),
                self.voting_deadline.is_some(),
            ])
            .one_of("status", &self.status, STATUSES)
            .length("notes", &self.notes, 0, 4096)
            .finish()
    }
}

pub struct MealPlans;

impl Resource for MealPlans {
    type Record = MealPlan;
    type CreateInput = MealPlanCreationInput;
    type UpdateInput = MealPlanUpdateInput;

    const KIND: ResourceKind = ResourceKind::MealPlan;
    const COLLECTION_PATH: &'static str = "/meal_plans";
    const ID_PARAM: &'static str = "mealPlanID";
    const HOUSEHOLD_SCOPED: bool = true;

    fn create(
        id: String,
        input: MealPlanCreationInput,
        scope: &Scope,
        session: &SessionContext,
    ) -> MealPlan {
        MealPlan {
            id,
            notes: input.notes,
            status: INITIAL_STATUS.to_string(),
            voting_deadline: input.voting_deadline.unwrap_or_else(Utc::now),
            election_method: input
                .election_method
                .unwrap_or_else(|| DEFAULT_ELECTION_METHOD.to_string()),
            belongs_to_household: scope.household_id().unwrap_or_default().to_string(),
            created_by_user: session.user_id().to_string(),
            lifecycle: Lifecycle::created_now(),
        }
    }

    fn update(record: &mut MealPlan, input: MealPlanUpdateInput) {
        super::assign(&mut record.notes, input.notes);
        super::assign(&mut record.status, input.status);
        super::assign(&mut record.voting_deadline, input.voting_deadline);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::testing;

    #[test]
    fn deadline_is_required() {
        let err = MealPlanCreationInput::default().validate().unwrap_err();
        assert_eq!(err.to_string(), "votingDeadline: cannot be blank");
    }

    #[test]
    fn new_plans_await_votes() {
        let input: MealPlanCreationInput =
            serde_json::from_str(r#"{"votingDeadline":"2030-01-01T00:00:00Z"}"#).expect("input");
        assert!(input.validate().is_ok());
        let session = testing::session();
        let scope = Scope::new(Some(session.active_household_id.clone()), Vec::new());
        let plan = MealPlans::create("mp1".to_string(), input, &scope, &session);
        assert_eq!(plan.status, "awaiting_votes");
        assert_eq!(plan.election_method, "schulze");
        assert_eq!(plan.scope_path(), vec!["household-1"]);
    }

    #[test]
    fn status_changes_are_constrained() {
        let input = MealPlanUpdateInput {
            status: Some("cancelled".to_string()),
            ..Default::default()
        };
        assert_eq!(input.validate().unwrap_err().field, "status");
    }
}
