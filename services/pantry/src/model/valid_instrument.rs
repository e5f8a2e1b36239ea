use crate::auth::session::SessionContext;
use crate::resource::{Lifecycle, Record, Resource, Scope};
use crate::validation::{Rules, Validate, Violation};
use pantry_common::ResourceKind;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidInstrument {
    pub id: String,
    pub name: String,
    pub plural_name: String,
    pub description: String,
    pub icon_path: String,
    pub slug: String,
    pub usable_for_storage: bool,
    pub display_in_summary_lists: bool,
    pub include_in_generated_instructions: bool,
    #[serde(flatten)]
    pub lifecycle: Lifecycle,
}

impl Record for ValidInstrument {
    const TABLE: &'static str = "valid_instruments";

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
pub struct ValidInstrumentCreationInput {
    pub name: String,
    pub plural_name: String,
    pub description: String,
    pub icon_path: String,
    pub slug: String,
    pub usable_for_storage: bool,
    pub display_in_summary_lists: bool,
    pub include_in_generated_instructions: bool,
}

impl Validate for ValidInstrumentCreationInput {
    fn validate(&self) -> Result<(), Violation> {
        Rules::new()
            .required("name", &self.name)
            .length("name", &self.name, 1, 128)
            .length("pluralName", &self.plural_name, 0, 128)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidInstrumentUpdateInput {
    pub name: Option<String>,
    pub plural_name: Option<String>,
    pub description: Option<String>,
    pub icon_path: Option<String>,
    pub slug: Option<String>,
    pub usable_for_storage: Option<bool>,
    pub display_in_summary_lists: Option<bool>,
    pub include_in_generated_instructions: Option<bool>,
}

impl Validate for ValidInstrumentUpdateInput {
    fn validate(&self) -> Result<(), Violation> {
        Rules::new()
            .at_least_one(&[
                self.name.is_some(),
                self.plural_name.is_some(),
                self.description.is_some(),
                self.icon_path.is_some(),
                self.slug.is_some(),
                self.usable_for_storage.is_some(),
                self.display_in_summary_lists.is_some(),
                self.include_in_generated_instructions.is_some(),
            ])
            .length("name", &self.name, 1, 128)
            .identifier("slug", &self.slug)
            .finish()
    }
}

pub struct ValidInstruments;

impl Resource for ValidInstruments {
    type Record = ValidInstrument;
    type CreateInput = ValidInstrumentCreationInput;
    type UpdateInput = ValidInstrumentUpdateInput;

    const KIND: ResourceKind = ResourceKind::ValidInstrument;
    const COLLECTION_PATH: &'static str = "/valid_instruments";
    const ID_PARAM: &'static str = "validInstrumentID";
    const SEARCHABLE: bool = true;

    fn create(
        id: String,
        input: ValidInstrumentCreationInput,
        _scope: &Scope,
        _session: &SessionContext,
    ) -> ValidInstrument {
        ValidInstrument {
            id,
            name: input.name,
            plural_name: input.plural_name,
            description: input.description,
            icon_path: input.icon_path,
            slug: input.slug,
            usable_for_storage: input.usable_for_storage,
            display_in_summary_lists: input.display_in_summary_lists,
            include_in_generated_instructions: input.include_in_generated_instructions,
            lifecycle: Lifecycle::created_now(),
        }
    }

    fn update(record: &mut ValidInstrument, input: ValidInstrumentUpdateInput) {
        super::assign(&mut record.name, input.name);
        super::assign(&mut record.plural_name, input.plural_name);
        super::assign(&mut record.description, input.description);
        super::assign(&mut record.icon_path, input.icon_path);
        super::assign(&mut record.slug, input.slug);
        super::assign(&mut record.usable_for_storage, input.usable_for_storage);
        super::assign(&mut record.display_in_summary_lists, input.display_in_summary_lists);
        super::assign(
            &mut record.include_in_generated_instructions,
            input.include_in_generated_instructions,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_text_covers_names_and_description() {
        let record = ValidInstruments::create(
            "i1".to_string(),
            ValidInstrumentCreationInput {
                name: "Whisk".to_string(),
                plural_name: "Whisks".to_string(),
                description: "balloon".to_string(),
                ..Default::default()
            },
            &Scope::unscoped(),
            &crate::model::testing::session(),
        );
        assert_eq!(record.search_text().as_deref(), Some("Whisk Whisks balloon"));
    }
}
