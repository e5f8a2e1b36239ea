//! OpenAPI document: probe paths plus the schemas of every record, input
//! and envelope type.
use crate::api::system;
use crate::api::types::{ErrorBody, ErrorEnvelope, HealthResponse, ResponseDetails};
use crate::filter::Pagination;
use crate::model::household_instrument_ownership::{
    HouseholdInstrumentOwnership, HouseholdInstrumentOwnershipCreationInput,
    HouseholdInstrumentOwnershipUpdateInput,
};
use crate::model::meal_plan::{MealPlan, MealPlanCreationInput, MealPlanUpdateInput};
use crate::model::meal_plan_option::{
    MealPlanOption, MealPlanOptionCreationInput, MealPlanOptionUpdateInput,
};
use crate::model::meal_plan_option_vote::{
    MealPlanOptionVote, MealPlanOptionVoteCreationInput, MealPlanOptionVoteUpdateInput,
};
use crate::model::recipe::{Recipe, RecipeCreationInput, RecipeUpdateInput};
use crate::model::recipe_step::{RecipeStep, RecipeStepCreationInput, RecipeStepUpdateInput};
use crate::model::service_setting::{
    ServiceSetting, ServiceSettingCreationInput, ServiceSettingUpdateInput,
};
use crate::model::service_setting_configuration::{
    ServiceSettingConfiguration, ServiceSettingConfigurationCreationInput,
    ServiceSettingConfigurationUpdateInput,
};
use crate::model::valid_instrument::{
    ValidInstrument, ValidInstrumentCreationInput, ValidInstrumentUpdateInput,
};
use crate::model::valid_measurement_unit::{
    ValidMeasurementUnit, ValidMeasurementUnitCreationInput, ValidMeasurementUnitUpdateInput,
};
use crate::model::valid_preparation::{
    ValidPreparation, ValidPreparationCreationInput, ValidPreparationUpdateInput,
};
use crate::model::webhook::{Webhook, WebhookCreationInput, WebhookUpdateInput};
use crate::resource::Lifecycle;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "pantry",
        version = "v1",
        description = "Recipe and meal planning HTTP API"
    ),
    paths(system::live, system::ready),
    components(schemas(
        ResponseDetails,
        Pagination,
        ErrorBody,
        ErrorEnvelope,
        HealthResponse,
        Lifecycle,
        ServiceSetting,
        ServiceSettingCreationInput,
        ServiceSettingUpdateInput,
        ServiceSettingConfiguration,
        ServiceSettingConfigurationCreationInput,
        ServiceSettingConfigurationUpdateInput,
        ValidMeasurementUnit,
        ValidMeasurementUnitCreationInput,
        ValidMeasurementUnitUpdateInput,
        ValidPreparation,
        ValidPreparationCreationInput,
        ValidPreparationUpdateInput,
        ValidInstrument,
        ValidInstrumentCreationInput,
        ValidInstrumentUpdateInput,
        Recipe,
        RecipeCreationInput,
        RecipeUpdateInput,
        RecipeStep,
        RecipeStepCreationInput,
        RecipeStepUpdateInput,
        MealPlan,
        MealPlanCreationInput,
        MealPlanUpdateInput,
        MealPlanOption,
        MealPlanOptionCreationInput,
        MealPlanOptionUpdateInput,
        MealPlanOptionVote,
        MealPlanOptionVoteCreationInput,
        MealPlanOptionVoteUpdateInput,
        HouseholdInstrumentOwnership,
        HouseholdInstrumentOwnershipCreationInput,
        HouseholdInstrumentOwnershipUpdateInput,
        Webhook,
        WebhookCreationInput,
        WebhookUpdateInput,
    )),
    tags(
        (name = "meta", description = "Process probes")
    )
)]
pub struct ApiDoc;
