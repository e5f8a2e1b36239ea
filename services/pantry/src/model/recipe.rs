//! Recipes. Steps live under their recipe in [`super::recipe_step`].
use crate::auth::session::SessionContext;
use crate::resource::{Lifecycle, Record, Resource, Scope};
use crate::validation::{Rules, Validate, Violation};
use pantry_common::ResourceKind;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

const MAX_PORTIONS: f32 = 1000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub source: String,
    pub description: String,
    #[serde(rename = "inspiredByRecipeID")]
    pub inspired_by_recipe_id: Option<String>,
    pub portion_name: String,
    pub plural_portion_name: String,
    pub minimum_estimated_portions: f32,
    pub maximum_estimated_portions: Option<f32>,
    pub seal_of_approval: bool,
    pub eligible_for_meals: bool,
    pub created_by_user: String,
    #[serde(flatten)]
    pub lifecycle: Lifecycle,
}

impl Record for Recipe {
    const TABLE: &'static str = "recipes";

    record_accessors!();

    fn scope_path(&self) -> Vec<String> {
        Vec::new()
    }

    fn search_text(&self) -> Option<String> {
        super::search_text([self.name.as_str(), self.description.as_str()])
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct RecipeCreationInput {
    pub name: String,
    pub slug: String,
    pub source: Option<String>,
    pub description: String,
    #[serde(rename = "inspiredByRecipeID")]
    pub inspired_by_recipe_id: Option<String>,
    pub portion_name: String,
    pub plural_portion_name: String,
    pub minimum_estimated_portions: f32,
    pub maximum_estimated_portions: Option<f32>,
    pub seal_of_approval: bool,
    pub eligible_for_meals: bool,
}

impl Default for RecipeCreationInput {
    fn default() -> Self {
        Self {
            name: String::new(),
            slug: String::new(),
            source: None,
            description: String::new(),
            inspired_by_recipe_id: None,
            portion_name: "portion".to_string(),
            plural_portion_name: "portions".to_string(),
            minimum_estimated_portions: 1.0,
            maximum_estimated_portions: None,
            seal_of_approval: false,
            eligible_for_meals: true,
        }
    }
}

impl Validate for RecipeCreationInput {
    fn validate(&self) -> Result<(), Violation> {
        Rules::new()
            .required("name", &self.name)
            .length("name", &self.name, 1, 256)
            .url("source", &self.source)
            .identifier("inspiredByRecipeID", &self.inspired_by_recipe_id)
            .range(
                "minimumEstimatedPortions",
                Some(self.minimum_estimated_portions),
                0.01,
                MAX_PORTIONS,
            )
            .range(
                "maximumEstimatedPortions",
                self.maximum_estimated_portions,
                0.01,
                MAX_PORTIONS,
            )
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct RecipeUpdateInput {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub source: Option<String>,
    pub description: Option<String>,
    pub portion_name: Option<String>,
    pub plural_portion_name: Option<String>,
    pub minimum_estimated_portions: Option<f32>,
    pub maximum_estimated_portions: Option<f32>,
    pub seal_of_approval: Option<bool>,
    pub eligible_for_meals: Option<bool>,
}

impl Validate for RecipeUpdateInput {
    fn validate(&self) -> Result<(), Violation> {
        Rules::new()
            .at_least_one(&[
                self.name.is_some(),
                self.slug.is_some(),
                self.source.is_some(),
                self.description.is_some(),
                self.portion_name.is_some(),
                self.plural_portion_name.is_some(),
                self.minimum_estimated_portions.is_some(),
                self.maximum_estimated_portions.is_some(),
                self.seal_of_approval.is_some(),
                self.eligible_for_meals.is_some(),
            ])
            .length("name", &self.name, 1, 256)
            .url("source", &self.source)
            .range(
                "minimumEstimatedPortions",
                self.minimum_estimated_portions,
                0.01,
                MAX_PORTIONS,
            )
            .range(
                "maximumEstimatedPortions",
                self.maximum_estimated_portions,
                0.01,
                MAX_PORTIONS,
            )
            .finish()
    }
}

pub struct Recipes;

impl Resource for Recipes {
    type Record = Recipe;
    type CreateInput = RecipeCreationInput;
    type UpdateInput = RecipeUpdateInput;

    const KIND: ResourceKind = ResourceKind::Recipe;
    const COLLECTION_PATH: &'static str = "/recipes";
    const ID_PARAM: &'static str = "recipeID";
    const SEARCHABLE: bool = true;

    fn create(
        id: String,
        input: RecipeCreationInput,
        _scope: &Scope,
        session: &SessionContext,
    ) -> Recipe {
        Recipe {
            id,
            name: input.name,
            slug: input.slug,
            source: input.source.unwrap_or_default(),
            description: input.description,
            inspired_by_recipe_id: input.inspired_by_recipe_id,
            portion_name: input.portion_name,
            plural_portion_name: input.plural_portion_name,
            minimum_estimated_portions: input.minimum_estimated_portions,
            maximum_estimated_portions: input.maximum_estimated_portions,
            seal_of_approval: input.seal_of_approval,
            eligible_for_meals: input.eligible_for_meals,
            created_by_user: session.user_id().to_string(),
            lifecycle: Lifecycle::created_now(),
        }
    }

    fn update(record: &mut Recipe, input: RecipeUpdateInput) {
        super::assign(&mut record.name, input.name);
        super::assign(&mut record.slug, input.slug);
        super::assign(&mut record.source, input.source);
        super::assign(&mut record.description, input.description);
        super::assign(&mut record.portion_name, input.portion_name);
        super::assign(&mut record.plural_portion_name, input.plural_portion_name);
        super::assign(
            &mut record.minimum_estimated_portions,
            input.minimum_estimated_portions,
        );
        super::assign_some(
            &mut record.maximum_estimated_portions,
            input.maximum_estimated_portions,
        );
        super::assign(&mut record.seal_of_approval, input.seal_of_approval);
        super::assign(&mut record.eligible_for_meals, input.eligible_for_meals);
    }

    fn check(record: &Recipe) -> Result<(), Violation> {
        Rules::new()
            .ensure(
                "maximumEstimatedPortions",
                record
                    .maximum_estimated_portions
                    .is_none_or(|maximum| maximum >= record.minimum_estimated_portions),
                "must not be below the minimum",
            )
            .finish()
    }
}
