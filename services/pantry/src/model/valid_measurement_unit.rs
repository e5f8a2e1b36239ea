use crate::auth::session::SessionContext;
use crate::resource::{Lifecycle, Record, Resource, Scope};
use crate::validation::{Rules, Validate, Violation};
use pantry_common::ResourceKind;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidMeasurementUnit {
    pub id: String,
    pub name: String,
    pub plural_name: String,
    pub description: String,
    pub icon_path: String,
    pub slug: String,
    pub volumetric: bool,
    pub universal: bool,
    pub metric: bool,
    pub imperial: bool,
    #[serde(flatten)]
    pub lifecycle: Lifecycle,
}

impl Record for ValidMeasurementUnit {
    const TABLE: &'static str = "valid_measurement_units";

    record_accessors!();

    fn scope_path(&self) -> Vec<String> {
        Vec::new()
    }

    fn search_text(&self) -> Option<String> {
        super::search_text([
            self.name.as_str(),
            self.plural_name.as_str(),
            self.description.as_str(),
        ])
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidMeasurementUnitCreationInput {
    pub name: String,
    pub plural_name: String,
    pub description: String,
    pub icon_path: String,
    pub slug: String,
    pub volumetric: bool,
    pub universal: bool,
    pub metric: bool,
    pub imperial: bool,
}

impl Validate for ValidMeasurementUnitCreationInput {
    fn validate(&self) -> Result<(), Violation> {
        let slug = (!self.slug.is_empty()).then(|| self.slug.clone());
        Rules::new()
            .required("name", &self.name)
            .length("name", &self.name, 1, 128)
            .identifier("slug", &slug)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidMeasurementUnitUpdateInput {
    pub name: Option<String>,
    pub plural_name: Option<String>,
    pub description: Option<String>,
    pub icon_path: Option<String>,
    pub slug: Option<String>,
    pub volumetric: Option<bool>,
    pub universal: Option<bool>,
    pub metric: Option<bool>,
    pub imperial: Option<bool>,
}

impl Validate for ValidMeasurementUnitUpdateInput {
    fn validate(&self) -> Result<(), Violation> {
        Rules::new()
            .at_least_one(&[
                self.name.is_some(),
                self.plural_name.is_some(),
                self.description.is_some(),
                self.icon_path.is_some(),
                self.slug.is_some(),
                self.volumetric.is_some(),
                self.universal.is_some(),
                self.metric.is_some(),
                self.imperial.is_some(),
            ])
            .length("name", &self.name, 1, 128)
            .identifier("slug", &self.slug)
            .finish()
    }
}

pub struct ValidMeasurementUnits;

impl Resource for ValidMeasurementUnits {
    type Record = ValidMeasurementUnit;
    type CreateInput = ValidMeasurementUnitCreationInput;
    type UpdateInput = ValidMeasurementUnitUpdateInput;

    const KIND: ResourceKind = ResourceKind::ValidMeasurementUnit;
    const COLLECTION_PATH: &'static str = "/valid_measurement_units";
    const ID_PARAM: &'static str = "validMeasurementUnitID";
    const SEARCHABLE: bool = true;

    fn create(
        id: String,
        input: ValidMeasurementUnitCreationInput,
        _scope: &Scope,
        _session: &SessionContext,
    ) -> ValidMeasurementUnit {
        ValidMeasurementUnit {
            id,
            name: input.name,
            plural_name: input.plural_name,
            description: input.description,
            icon_path: input.icon_path,
            slug: input.slug,
            volumetric: input.volumetric,
            universal: input.universal,
            metric: input.metric,
            imperial: input.imperial,
            lifecycle: Lifecycle::created_now(),
        }
    }

    fn update(record: &mut ValidMeasurementUnit, input: ValidMeasurementUnitUpdateInput) {
        super::assign(&mut record.name, input.name);
        super::assign(&mut record.plural_name, input.plural_name);
        super::assign(&mut record.description, input.description);
        super::assign(&mut record.icon_path, input.icon_path);
        super::assign(&mut record.slug, input.slug);
        super::assign(&mut record.volumetric, input.volumetric);
        super::assign(&mut record.universal, input.universal);
        super::assign(&mut record.metric, input.metric);
        super::assign(&mut record.imperial, input.imperial);
    }

    fn check(record: &ValidMeasurementUnit) -> Result<(), Violation> {
        Rules::new()
            .ensure(
                "metric",
                !(record.metric && record.imperial),
                "cannot be both metric and imperial",
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_systems_are_exclusive() {
        let mut unit = ValidMeasurementUnits::create(
            "u1".to_string(),
            ValidMeasurementUnitCreationInput {
                name: "cup".to_string(),
                imperial: true,
                ..Default::default()
            },
            &Scope::unscoped(),
            &crate::model::testing::session(),
        );
        assert!(ValidMeasurementUnits::check(&unit).is_ok());

        let change = ValidMeasurementUnitUpdateInput {
            metric: Some(true),
            ..Default::default()
        };
        assert!(change.validate().is_ok());
        ValidMeasurementUnits::update(&mut unit, change);
        assert_eq!(ValidMeasurementUnits::check(&unit).unwrap_err().field, "metric");
    }

    #[test]
    fn blank_slug_is_allowed_but_bad_slug_is_not() {
        let mut input = ValidMeasurementUnitCreationInput {
            name: "gram".to_string(),
            metric: true,
            ..Default::default()
        };
        assert!(input.validate().is_ok());
        input.slug = "two words".to_string();
        assert_eq!(input.validate().unwrap_err().field, "slug");
    }
}
