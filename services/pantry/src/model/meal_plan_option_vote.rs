use super::meal_plan_option::MEAL_PLAN_PARAM;
use crate::auth::session::SessionContext;
use crate::resource::{Lifecycle, Record, Resource, Scope};
use crate::validation::{Rules, Validate, Violation};
use pantry_common::ResourceKind;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

const MEAL_PLAN_OPTION_PARAM: &str = "mealPlanOptionID";
const MAX_RANK: u8 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MealPlanOptionVote {
    pub id: String,
    pub rank: u8,
    pub abstain: bool,
    pub notes: String,
    pub by_user: String,
    pub belongs_to_meal_plan_option: String,
    pub belongs_to_meal_plan: String,
    pub belongs_to_household: String,
    #[serde(flatten)]
    pub lifecycle: Lifecycle,
}

impl Record for MealPlanOptionVote {
    const TABLE: &'static str = "meal_plan_option_votes";

    record_accessors!();

    fn scope_path(&self) -> Vec<String> {
        vec![
            self.belongs_to_household.clone(),
            self.belongs_to_meal_plan.clone(),
            self.belongs_to_meal_plan_option.clone(),
        ]
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct MealPlanOptionVoteCreationInput {
    pub rank: Option<u8>,
    pub abstain: bool,
    pub notes: String,
}

impl Validate for MealPlanOptionVoteCreationInput {
    fn validate(&self) -> Result<(), Violation> {
        Rules::new()
            .ensure(
                "rank",
                self.abstain || self.rank.is_some(),
                "required unless abstaining",
            )
            .range("rank", self.rank, 0, MAX_RANK)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct MealPlanOptionVoteUpdateInput {
    pub rank: Option<u8>,
    pub abstain: Option<bool>,
    pub notes: Option<String>,
}

impl Validate for MealPlanOptionVoteUpdateInput {
    fn validate(&self) -> Result<(), Violation> {
        Rules::new()
            .at_least_one(&[
                self.rank.is_some(),
                self.abstain.is_some(),
                self.notes.is_some(),
            ])
            .range("rank", self.rank, 0, MAX_RANK)
            .finish()
    }
}

pub struct MealPlanOptionVotes;

impl Resource for MealPlanOptionVotes {
    type Record = MealPlanOptionVote;
    type CreateInput = MealPlanOptionVoteCreationInput;
    type UpdateInput = MealPlanOptionVoteUpdateInput;

    const KIND: ResourceKind = ResourceKind::MealPlanOptionVote;
    const COLLECTION_PATH: &'static str =
        "/meal_plans/:mealPlanID/options/:mealPlanOptionID/votes";
    const ID_PARAM: &'static str = "mealPlanOptionVoteID";
    const PARENT_PARAMS: &'static [&'static str] = &[MEAL_PLAN_PARAM, MEAL_PLAN_OPTION_PARAM];
    const HOUSEHOLD_SCOPED: bool = true;

    fn create(
        id: String,
        input: MealPlanOptionVoteCreationInput,
        scope: &Scope,
        session: &SessionContext,
    ) -> MealPlanOptionVote {
        MealPlanOptionVote {
            id,
            rank: input.rank.unwrap_or_default(),
            abstain: input.abstain,
            notes: input.notes,
            by_user: session.user_id().to_string(),
            belongs_to_meal_plan_option: scope.parent(MEAL_PLAN_OPTION_PARAM).to_string(),
            belongs_to_meal_plan: scope.parent(MEAL_PLAN_PARAM).to_string(),
            belongs_to_household: scope.household_id().unwrap_or_default().to_string(),
            lifecycle: Lifecycle::created_now(),
        }
    }

    fn update(record: &mut MealPlanOptionVote, input: MealPlanOptionVoteUpdateInput) {
        super::assign(&mut record.rank, input.rank);
        super::assign(&mut record.abstain, input.abstain);
        super::assign(&mut record.notes, input.notes);
    }
}
