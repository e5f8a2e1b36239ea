use crate::auth::session::SessionContext;
use crate::resource::{Lifecycle, Record, Resource, Scope};
use crate::validation::{Rules, Validate, Violation};
use pantry_common::ResourceKind;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

const RECIPE_PARAM: &str = "recipeID";
const MAX_STEP_INDEX: u32 = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeStep {
    pub id: String,
    pub index: u32,
    #[serde(rename = "preparationID")]
    pub preparation_id: String,
    pub minimum_estimated_time_in_seconds: Option<u32>,
    pub maximum_estimated_time_in_seconds: Option<u32>,
    pub minimum_temperature_in_celsius: Option<f32>,
    pub maximum_temperature_in_celsius: Option<f32>,
    pub notes: String,
    pub explicit_instructions: String,
    pub condition_expression: String,
    pub optional: bool,
    pub start_timer_automatically: bool,
    pub belongs_to_recipe: String,
    #[serde(flatten)]
    pub lifecycle: Lifecycle,
}

impl Record for RecipeStep {
    const TABLE: &'static str = "recipe_steps";

    record_accessors!();

    fn scope_path(&self) -> Vec<String> {
        vec![self.belongs_to_recipe.clone()]
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct RecipeStepCreationInput {
    pub index: u32,
    #[serde(rename = "preparationID")]
    pub preparation_id: String,
    pub minimum_estimated_time_in_seconds: Option<u32>,
    pub maximum_estimated_time_in_seconds: Option<u32>,
    pub minimum_temperature_in_celsius: Option<f32>,
    pub maximum_temperature_in_celsius: Option<f32>,
    pub notes: String,
    pub explicit_instructions: String,
    pub condition_expression: String,
    pub optional: bool,
    pub start_timer_automatically: bool,
}

fn ordered<N: PartialOrd>(minimum: Option<N>, maximum: Option<N>) -> bool {
    match (minimum, maximum) {
        (Some(minimum), Some(maximum)) => maximum >= minimum,
        _ => true,
    }
}

impl Validate for RecipeStepCreationInput {
    fn validate(&self) -> Result<(), Violation> {
        Rules::new()
            .required("preparationID", &self.preparation_id)
            .identifier("preparationID", &self.preparation_id)
            .range("index", Some(self.index), 0, MAX_STEP_INDEX)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct RecipeStepUpdateInput {
    pub index: Option<u32>,
    #[serde(rename = "preparationID")]
    pub preparation_id: Option<String>,
    pub minimum_estimated_time_in_seconds: Option<u32>,
    pub maximum_estimated_time_in_seconds: Option<u32>,
    pub minimum_temperature_in_celsius: Option<f32>,
    pub maximum_temperature_in_celsius: Option<f32>,
    pub notes: Option<String>,
    pub explicit_instructions: Option<String>,
    pub condition_expression: Option<String>,
    pub optional: Option<bool>,
    pub start_timer_automatically: Option<bool>,
}

impl Validate for RecipeStepUpdateInput {
    fn validate(&self) -> Result<(), Violation> {
        Rules::new()
            .at_least_one(&[
                self.index.is_some(),
                self.preparation_id.is_some(),
                self.minimum_estimated_time_in_seconds.is_some(),
                self.maximum_estimated_time_in_seconds.is_some(),
                self.minimum_temperature_in_celsius.is_some(),
                self.maximum_temperature_in_celsius.is_some(),
                self.notes.is_some(),
                self.explicit_instructions.is_some(),
                self.condition_expression.is_some(),
                self.optional.is_some(),
                self.start_timer_automatically.is_some(),
            ])
            .identifier("preparationID", &self.preparation_id)
            .range("index", self.index, 0, MAX_STEP_INDEX)
            .finish()
    }
}

pub struct RecipeSteps;

impl Resource for RecipeSteps {
    type Record = RecipeStep;
    type CreateInput = RecipeStepCreationInput;
    type UpdateInput = RecipeStepUpdateInput;

    const KIND: ResourceKind = ResourceKind::RecipeStep;
    const COLLECTION_PATH: &'static str = "/recipes/:recipeID/steps";
    const ID_PARAM: &'static str = "recipeStepID";
    const PARENT_PARAMS: &'static [&'static str] = &[RECIPE_PARAM];

    fn create(
        id: String,
        input: RecipeStepCreationInput,
        scope: &Scope,
        _session: &SessionContext,
    ) -> RecipeStep {
        RecipeStep {
            id,
            index: input.index,
            preparation_id: input.preparation_id,
            minimum_estimated_time_in_seconds: input.minimum_estimated_time_in_seconds,
            maximum_estimated_time_in_seconds: input.maximum_estimated_time_in_seconds,
            minimum_temperature_in_celsius: input.minimum_temperature_in_celsius,
            maximum_temperature_in_celsius: input.maximum_temperature_in_celsius,
            notes: input.notes,
            explicit_instructions: input.explicit_instructions,
            condition_expression: input.condition_expression,
            optional: input.optional,
            start_timer_automatically: input.start_timer_automatically,
            belongs_to_recipe: scope.parent(RECIPE_PARAM).to_string(),
            lifecycle: Lifecycle::created_now(),
        }
    }

    fn update(record: &mut RecipeStep, input: RecipeStepUpdateInput) {
        super::assign(&mut record.index, input.index);
        super::assign(&mut record.preparation_id, input.preparation_id);
        super::assign_some(
            &mut record.minimum_estimated_time_in_seconds,
            input.minimum_estimated_time_in_seconds,
        );
        super::assign_some(
            &mut record.maximum_estimated_time_in_seconds,
            input.maximum_estimated_time_in_seconds,
        );
        super::assign_some(
            &mut record.minimum_temperature_in_celsius,
            input.minimum_temperature_in_celsius,
        );
        super::assign_some(
            &mut record.maximum_temperature_in_celsius,
            input.maximum_temperature_in_celsius,
        );
        super::assign(&mut record.notes, input.notes);
        super::assign(&mut record.explicit_instructions, input.explicit_instructions);
        super::assign(&mut record.condition_expression, input.condition_expression);
        super::assign(&mut record.optional, input.optional);
        super::assign(
            &mut record.start_timer_automatically,
            input.start_timer_automatically,
        );
    }

    fn check(record: &RecipeStep) -> Result<(), Violation> {
        Rules::new()
            .ensure(
                "maximumEstimatedTimeInSeconds",
                ordered(
                    record.minimum_estimated_time_in_seconds,
                    record.maximum_estimated_time_in_seconds,
                ),
                "must not be below the minimum",
            )
            .ensure(
                "maximumTemperatureInCelsius",
                ordered(
                    record.minimum_temperature_in_celsius,
                    record.maximum_temperature_in_celsius,
                ),
                "must not be below the minimum",
            )
            .ensure(
                "explicitInstructions",
                !record.notes.trim().is_empty() || !record.explicit_instructions.trim().is_empty(),
                "either notes or explicit instructions are required",
            )
            .finish()
    }
}
