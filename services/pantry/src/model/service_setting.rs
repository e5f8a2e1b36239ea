//! Service settings: the catalogue of settings users and households can
//! configure, each with an optional default and an optional closed set of
//! allowed values.
use crate::auth::session::SessionContext;
use crate::resource::{Lifecycle, Record, Resource, Scope};
use crate::validation::{Rules, Validate, Violation};
use pantry_common::ResourceKind;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const SETTING_TYPES: &[&str] = &["user", "household", "membership"];
const DEFAULT_SETTING_TYPE: &str = "user";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSetting {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub setting_type: String,
    pub description: String,
    pub default_value: Option<String>,
    pub enumeration: Vec<String>,
    pub admins_only: bool,
    #[serde(flatten)]
    pub lifecycle: Lifecycle,
}

impl Record for ServiceSetting {
    const TABLE: &'static str = "service_settings";

    record_accessors!();

    fn scope_path(&self) -> Vec<String> {
        Vec::new()
    }

    fn search_text(&self) -> Option<String> {
        super::search_text([self.name.as_str(), self.description.as_str()])
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceSettingCreationInput {
    pub name: String,
    #[serde(rename = "type")]
    pub setting_type: Option<String>,
    pub description: String,
    pub default_value: Option<String>,
    pub enumeration: Vec<String>,
    pub admins_only: bool,
}

fn default_in_enumeration(default_value: Option<&str>, enumeration: &[String]) -> bool {
    match default_value {
        Some(value) if !enumeration.is_empty() => enumeration.iter().any(|allowed| allowed == value),
        _ => true,
    }
}

impl Validate for ServiceSettingCreationInput {
    fn validate(&self) -> Result<(), Violation> {
        Rules::new()
            .required("name", &self.name)
            .length("name", &self.name, 1, 128)
            .one_of("type", &self.setting_type, SETTING_TYPES)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceSettingUpdateInput {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub setting_type: Option<String>,
    pub description: Option<String>,
    pub default_value: Option<String>,
    pub enumeration: Option<Vec<String>>,
    pub admins_only: Option<bool>,
}

impl Validate for ServiceSettingUpdateInput {
    fn validate(&self) -> Result<(), Violation> {
        Rules::new()
            .at_least_one(&[
                self.name.is_some(),
                self.setting_type.is_some(),
                self.description.is_some(),
                self.default_value.is_some(),
                self.enumeration.is_some(),
                self.admins_only.is_some(),
            ])
            .length("name", &self.name, 1, 128)
            .one_of("type", &self.setting_type, SETTING_TYPES)
            .finish()
    }
}

pub struct ServiceSettings;

impl Resource for ServiceSettings {
    type Record = ServiceSetting;
    type CreateInput = ServiceSettingCreationInput;
    type UpdateInput = ServiceSettingUpdateInput;

    const KIND: ResourceKind = ResourceKind::ServiceSetting;
    const COLLECTION_PATH: &'static str = "/service_settings";
    const ID_PARAM: &'static str = "serviceSettingID";
    const SEARCHABLE: bool = true;

    fn create(
        id: String,
        input: ServiceSettingCreationInput,
        _scope: &Scope,
        _session: &SessionContext,
    ) -> ServiceSetting {
        ServiceSetting {
            id,
            name: input.name,
            setting_type: input
                .setting_type
                .unwrap_or_else(|| DEFAULT_SETTING_TYPE.to_string()),
            description: input.description,
            default_value: input.default_value,
            enumeration: input.enumeration,
            admins_only: input.admins_only,
            lifecycle: Lifecycle::created_now(),
        }
    }

    fn update(record: &mut ServiceSetting, input: ServiceSettingUpdateInput) {
        super::assign(&mut record.name, input.name);
        super::assign(&mut record.setting_type, input.setting_type);
        super::assign(&mut record.description, input.description);
        super::assign_some(&mut record.default_value, input.default_value);
        super::assign(&mut record.enumeration, input.enumeration);
        super::assign(&mut record.admins_only, input.admins_only);
    }

    fn check(record: &ServiceSetting) -> Result<(), Violation> {
        Rules::new()
            .ensure(
                "defaultValue",
                default_in_enumeration(record.default_value.as_deref(), &record.enumeration),
                "must be one of the enumerated values",
            )
            .finish()
    }
}
