use crate::auth::session::SessionContext;
use crate::resource::{Lifecycle, Record, Resource, Scope};
use crate::validation::{Rules, Validate, Violation};
use pantry_common::ResourceKind;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub(crate) const MEAL_PLAN_PARAM: &str = "mealPlanID";
const MIN_SCALE: f32 = 0.01;
const MAX_SCALE: f32 = 100.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MealPlanOption {
    pub id: String,
    #[serde(rename = "mealID")]
    pub meal_id: String,
    pub notes: String,
    pub meal_scale: f32,
    pub assigned_cook: Option<String>,
    pub assigned_dishwasher: Option<String>,
    pub chosen: bool,
    pub tie_broken: bool,
    pub belongs_to_meal_plan: String,
    pub belongs_to_household: String,
    #[serde(flatten)]
    pub lifecycle: Lifecycle,
}

impl Record for MealPlanOption {
    const TABLE: &'static str = "meal_plan_options";

    record_accessors!();

    fn scope_path(&self) -> Vec<String> {
        vec![
            self.belongs_to_household.clone(),
            self.belongs_to_meal_plan.clone(),
        ]
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct MealPlanOptionCreationInput {
    #[serde(rename = "mealID")]
    pub meal_id: String,
    pub notes: String,
    pub meal_scale: f32,
    pub assigned_cook: Option<String>,
    pub assigned_dishwasher: Option<String>,
}

impl Default for MealPlanOptionCreationInput {
    fn default() -> Self {
        Self {
            meal_id: String::new(),
            notes: String::new(),
            meal_scale: 1.0,
            assigned_cook: None,
            assigned_dishwasher: None,
        }
    }
}

impl Validate for MealPlanOptionCreationInput {
    fn validate(&self) -> Result<(), Violation> {
        Rules::new()
            .required("mealID", &self.meal_id)
            .identifier("mealID", &self.meal_id)
            .range("mealScale", Some(self.meal_scale), MIN_SCALE, MAX_SCALE)
            .identifier("assignedCook", &self.assigned_cook)
            .identifier("assignedDishwasher", &self.assigned_dishwasher)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct MealPlanOptionUpdateInput {
    #[serde(rename = "mealID")]
    pub meal_id: Option<String>,
    pub notes: Option<String>,
    pub meal_scale: Option<f32>,
    pub assigned_cook: Option<String>,
    pub assigned_dishwasher: Option<String>,
}

impl Validate for MealPlanOptionUpdateInput {
    fn validate(&self) -> Result<(), Violation> {
        Rules::new()
            .at_least_one(&[
                self.meal_id.is_some(),
                self.notes.is_some(),
                self.meal_scale.is_some(),
                self.assigned_cook.is_some(),
                self.assigned_dishwasher.is_some(),
            ])
            .identifier("mealID", &self.meal_id)
            .range("mealScale", self.meal_scale, MIN_SCALE, MAX_SCALE)
            .identifier("assignedCook", &self.assigned_cook)
            .identifier("assignedDishwasher", &self.assigned_dishwasher)
            .finish()
    }
}

pub struct MealPlanOptions;

impl Resource for MealPlanOptions {
    type Record = MealPlanOption;
    type CreateInput = MealPlanOptionCreationInput;
    type UpdateInput = MealPlanOptionUpdateInput;

    const KIND: ResourceKind = ResourceKind::MealPlanOption;
    const COLLECTION_PATH: &'static str = "/meal_plans/:mealPlanID/options";
    const ID_PARAM: &'static str = "mealPlanOptionID";
    const PARENT_PARAMS: &'static [&'static str] = &[MEAL_PLAN_PARAM];
    const HOUSEHOLD_SCOPED: bool = true;

    fn create(
        id: String,
        input: MealPlanOptionCreationInput,
        scope: &Scope,
        _session: &SessionContext,
    ) -> MealPlanOption {
        MealPlanOption {
            id,
            meal_id: input.meal_id,
            notes: input.notes,
            meal_scale: input.meal_scale,
            assigned_cook: input.assigned_cook,
            assigned_dishwasher: input.assigned_dishwasher,
            chosen: false,
            tie_broken: false,
            belongs_to_meal_plan: scope.parent(MEAL_PLAN_PARAM).to_string(),
            belongs_to_household: scope.household_id().unwrap_or_default().to_string(),
            lifecycle: Lifecycle::created_now(),
        }
    }

    fn update(record: &mut MealPlanOption, input: MealPlanOptionUpdateInput) {
        super::assign(&mut record.meal_id, input.meal_id);
        super::assign(&mut record.notes, input.notes);
        super::assign(&mut record.meal_scale, input.meal_scale);
        super::assign_some(&mut record.assigned_cook, input.assigned_cook);
        super::assign_some(&mut record.assigned_dishwasher, input.assigned_dishwasher);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::testing;

    #[test]
    fn scope_path_is_household_then_plan() {
        let session = testing::session();
        let scope = Scope::new(
            Some(session.active_household_id.clone()),
            vec![(MEAL_PLAN_PARAM, "mp1".to_string())],
        );
        let input = MealPlanOptionCreationInput {
            meal_id: "meal-1".to_string(),
            ..Default::default()
        };
        assert!(input.validate().is_ok());
        let option = MealPlanOptions::create("o1".to_string(), input, &scope, &session);
        assert_eq!(option.scope_path(), vec!["household-1", "mp1"]);
        assert_eq!(option.scope_path(), scope.path());
        assert!(!option.chosen);
    }

    #[test]
    fn scale_must_be_positive() {
        let input = MealPlanOptionCreationInput {
            meal_id: "meal-1".to_string(),
            meal_scale: 0.0,
            ..Default::default()
        };
        assert_eq!(input.validate().unwrap_err().field, "mealScale");
    }
}
