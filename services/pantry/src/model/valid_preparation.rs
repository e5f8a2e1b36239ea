//! Preparations (dice, sauté, ...) a recipe step can perform, with the
//! ingredient and instrument counts they require.
use crate::auth::session::SessionContext;
use crate::resource::{Lifecycle, Record, Resource, Scope};
use crate::validation::{Rules, Validate, Violation};
use pantry_common::ResourceKind;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

const MAX_COUNT: u16 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidPreparation {
    pub id: String,
    pub name: String,
    pub description: String,
    pub past_tense: String,
    pub icon_path: String,
    pub slug: String,
    pub yields_nothing: bool,
    pub restrict_to_ingredients: bool,
    pub temperature_required: bool,
    pub minimum_ingredient_count: u16,
    pub maximum_ingredient_count: Option<u16>,
    pub minimum_instrument_count: u16,
    pub maximum_instrument_count: Option<u16>,
    #[serde(flatten)]
    pub lifecycle: Lifecycle,
}

impl Record for ValidPreparation {
    const TABLE: &'static str = "valid_preparations";

    record_accessors!();

    fn scope_path(&self) -> Vec<String> {
        Vec::new()
    }

    fn search_text(&self) -> Option<String> {
        super::search_text([
            self.name.as_str(),
            self.past_tense.as_str(),
            self.description.as_str(),
        ])
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidPreparationCreationInput {
    pub name: String,
    pub description: String,
    pub past_tense: String,
    pub icon_path: String,
    pub slug: String,
    pub yields_nothing: bool,
    pub restrict_to_ingredients: bool,
    pub temperature_required: bool,
    pub minimum_ingredient_count: u16,
    pub maximum_ingredient_count: Option<u16>,
    pub minimum_instrument_count: u16,
    pub maximum_instrument_count: Option<u16>,
}

impl Default for ValidPreparationCreationInput {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            past_tense: String::new(),
            icon_path: String::new(),
            slug: String::new(),
            yields_nothing: false,
            restrict_to_ingredients: true,
            temperature_required: false,
            minimum_ingredient_count: 1,
            maximum_ingredient_count: None,
            minimum_instrument_count: 1,
            maximum_instrument_count: None,
        }
    }
}

fn bounds_ordered(minimum: u16, maximum: Option<u16>) -> bool {
    maximum.is_none_or(|maximum| maximum >= minimum)
}

impl Validate for ValidPreparationCreationInput {
    fn validate(&self) -> Result<(), Violation> {
        Rules::new()
            .required("name", &self.name)
            .length("name", &self.name, 1, 128)
            .range("minimumIngredientCount", Some(self.minimum_ingredient_count), 0, MAX_COUNT)
            .range("maximumIngredientCount", self.maximum_ingredient_count, 0, MAX_COUNT)
            .range("minimumInstrumentCount", Some(self.minimum_instrument_count), 0, MAX_COUNT)
            .range("maximumInstrumentCount", self.maximum_instrument_count, 0, MAX_COUNT)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidPreparationUpdateInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub past_tense: Option<String>,
    pub icon_path: Option<String>,
    pub slug: Option<String>,
    pub yields_nothing: Option<bool>,
    pub restrict_to_ingredients: Option<bool>,
    pub temperature_required: Option<bool>,
    pub minimum_ingredient_count: Option<u16>,
    pub maximum_ingredient_count: Option<u16>,
    pub minimum_instrument_count: Option<u16>,
    pub maximum_instrument_count: Option<u16>,
}

impl Validate for ValidPreparationUpdateInput {
    fn validate(&self) -> Result<(), Violation> {
        Rules::new()
            .at_least_one(&[
                self.name.is_some(),
                self.description.is_some(),
                self.past_tense.is_some(),
                self.icon_path.is_some(),
                self.slug.is_some(),
                self.yields_nothing.is_some(),
                self.restrict_to_ingredients.is_some(),
                self.temperature_required.is_some(),
                self.minimum_ingredient_count.is_some(),
                self.maximum_ingredient_count.is_some(),
                self.minimum_instrument_count.is_some(),
                self.maximum_instrument_count.is_some(),
            ])
            .length("name", &self.name, 1, 128)
            .identifier("slug", &self.slug)
            .range("minimumIngredientCount", self.minimum_ingredient_count, 0, MAX_COUNT)
            .range("maximumIngredientCount", self.maximum_ingredient_count, 0, MAX_COUNT)
            .range("minimumInstrumentCount", self.minimum_instrument_count, 0, MAX_COUNT)
            .range("maximumInstrumentCount", self.maximum_instrument_count, 0, MAX_COUNT)
            .finish()
    }
}

pub struct ValidPreparations;

impl Resource for ValidPreparations {
    type Record = ValidPreparation;
    type CreateInput = ValidPreparationCreationInput;
    type UpdateInput = ValidPreparationUpdateInput;

    const KIND: ResourceKind = ResourceKind::ValidPreparation;
    const COLLECTION_PATH: &'static str = "/valid_preparations";
    const ID_PARAM: &'static str = "validPreparationID";
    const SEARCHABLE: bool = true;

    fn create(
        id: String,
        input: ValidPreparationCreationInput,
        _scope: &Scope,
        _session: &SessionContext,
    ) -> ValidPreparation {
        ValidPreparation {
            id,
            name: input.name,
            description: input.description,
            past_tense: input.past_tense,
            icon_path: input.icon_path,
            slug: input.slug,
            yields_nothing: input.yields_nothing,
            restrict_to_ingredients: input.restrict_to_ingredients,
            temperature_required: input.temperature_required,
            minimum_ingredient_count: input.minimum_ingredient_count,
            maximum_ingredient_count: input.maximum_ingredient_count,
            minimum_instrument_count: input.minimum_instrument_count,
            maximum_instrument_count: input.maximum_instrument_count,
            lifecycle: Lifecycle::created_now(),
        }
    }

    fn update(record: &mut ValidPreparation, input: ValidPreparationUpdateInput) {
        super::assign(&mut record.name, input.name);
        super::assign(&mut record.description, input.description);
        super::assign(&mut record.past_tense, input.past_tense);
        super::assign(&mut record.icon_path, input.icon_path);
        super::assign(&mut record.slug, input.slug);
        super::assign(&mut record.yields_nothing, input.yields_nothing);
        super::assign(&mut record.restrict_to_ingredients, input.restrict_to_ingredients);
        super::assign(&mut record.temperature_required, input.temperature_required);
        super::assign(&mut record.minimum_ingredient_count, input.minimum_ingredient_count);
        super::assign_some(&mut record.maximum_ingredient_count, input.maximum_ingredient_count);
        super::assign(&mut record.minimum_instrument_count, input.minimum_instrument_count);
        super::assign_some(&mut record.maximum_instrument_count, input.maximum_instrument_count);
    }

    fn check(record: &ValidPreparation) -> Result<(), Violation> {
        Rules::new()
            .ensure(
                "maximumIngredientCount",
                bounds_ordered(record.minimum_ingredient_count, record.maximum_ingredient_count),
                "must not be below the minimum",
            )
            .ensure(
                "maximumInstrumentCount",
                bounds_ordered(record.minimum_instrument_count, record.maximum_instrument_count),
                "must not be below the minimum",
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn omitted_counts_take_defaults() {
        let input: ValidPreparationCreationInput =
            serde_json::from_str(r#"{"name":"dice","pastTense":"diced"}"#).expect("input");
        assert_eq!(input.minimum_ingredient_count, 1);
        assert!(input.restrict_to_ingredients);
        assert!(input.validate().is_ok());
    }

    fn preparation(input: ValidPreparationCreationInput) -> ValidPreparation {
        ValidPreparations::create(
            "p1".to_string(),
            input,
            &Scope::unscoped(),
            &crate::model::testing::session(),
        )
    }

    #[test]
    fn maximum_cannot_undercut_minimum() {
        let record = preparation(ValidPreparationCreationInput {
            name: "dice".to_string(),
            minimum_ingredient_count: 3,
            maximum_ingredient_count: Some(2),
            ..Default::default()
        });
        assert_eq!(
            ValidPreparations::check(&record).unwrap_err().field,
            "maximumIngredientCount"
        );
    }

    #[test]
    fn raising_the_minimum_past_the_maximum_is_rejected() {
        let mut record = preparation(ValidPreparationCreationInput {
            name: "dice".to_string(),
            minimum_instrument_count: 1,
            maximum_instrument_count: Some(2),
            ..Default::default()
        });
        assert!(ValidPreparations::check(&record).is_ok());
        let change = ValidPreparationUpdateInput {
            minimum_instrument_count: Some(5),
            ..Default::default()
        };
        assert!(change.validate().is_ok());
        ValidPreparations::update(&mut record, change);
        assert_eq!(
            ValidPreparations::check(&record).unwrap_err().field,
            "maximumInstrumentCount"
        );
    }
}
