//! Route table.
//!
//! Every resource gets the same six routes from [`resource_router`]; the
//! table in [`resource_routes`] lists which resources are mounted.
use crate::api::pipeline::{
    ResourceService, archive_handler, create_handler, list_handler, read_handler,
    search_handler, update_handler,
};
use crate::app::AppState;
use crate::model::household_instrument_ownership::HouseholdInstrumentOwnerships;
use crate::model::meal_plan::MealPlans;
use crate::model::meal_plan_option::MealPlanOptions;
use crate::model::meal_plan_option_vote::MealPlanOptionVotes;
use crate::model::recipe::Recipes;
use crate::model::recipe_step::RecipeSteps;
use crate::model::service_setting::ServiceSettings;
use crate::model::service_setting_configuration::ServiceSettingConfigurations;
use crate::model::valid_instrument::ValidInstruments;
use crate::model::valid_measurement_unit::ValidMeasurementUnits;
use crate::model::valid_preparation::ValidPreparations;
use crate::model::webhook::Webhooks;
use crate::resource::Resource;
use axum::Router;
use axum::routing::get;
use std::sync::Arc;

/// Collection, search (when the resource is searchable) and item routes for `R`.
pub fn resource_router<R: Resource>(service: ResourceService<R>) -> Router {
    let collection = R::COLLECTION_PATH;
    let item = format!("{collection}/:{}", R::ID_PARAM);

    let mut router = Router::new()
        .route(
            collection,
            get(list_handler::<R>).post(create_handler::<R>),
        )
        .route(
            &item,
            get(read_handler::<R>)
                .put(update_handler::<R>)
                .delete(archive_handler::<R>),
        );
    if R::SEARCHABLE {
        router = router.route(&format!("{collection}/search"), get(search_handler::<R>));
    }
    router.with_state(Arc::new(service))
}

fn mount<R: Resource>(state: &AppState) -> Router {
    resource_router(ResourceService::<R>::new(
        state.storage.manager::<R::Record>(),
        Arc::clone(&state.publisher),
        state.search_index.clone(),
        state.pipeline,
    ))
}

/// All resource routes, relative to the API prefix.
pub fn resource_routes(state: &AppState) -> Router {
    Router::new()
        .merge(mount::<ServiceSettings>(state))
        .merge(mount::<ServiceSettingConfigurations>(state))
        .merge(mount::<ValidMeasurementUnits>(state))
        .merge(mount::<ValidPreparations>(state))
        .merge(mount::<ValidInstruments>(state))
        .merge(mount::<Recipes>(state))
        .merge(mount::<RecipeSteps>(state))
        .merge(mount::<MealPlans>(state))
        .merge(mount::<MealPlanOptions>(state))
        .merge(mount::<MealPlanOptionVotes>(state))
        .merge(mount::<HouseholdInstrumentOwnerships>(state))
        .merge(mount::<Webhooks>(state))
}
