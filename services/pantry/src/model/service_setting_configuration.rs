//! A household's (or user's) chosen value for a service setting.
use crate::auth::session::SessionContext;
use crate::resource::{Lifecycle, Record, Resource, Scope};
use crate::validation::{Rules, Validate, Violation};
use pantry_common::ResourceKind;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSettingConfiguration {
    pub id: String,
    pub value: String,
    pub notes: String,
    #[serde(rename = "serviceSettingID")]
    pub service_setting_id: String,
    pub belongs_to_user: String,
    pub belongs_to_household: String,
    #[serde(flatten)]
    pub lifecycle: Lifecycle,
}

impl Record for ServiceSettingConfiguration {
    const TABLE: &'static str = "service_setting_configurations";

    record_accessors!();

    fn scope_path(&self) -> Vec<String> {
        vec![self.belongs_to_household.clone()]
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceSettingConfigurationCreationInput {
    pub value: String,
    pub notes: String,
    #[serde(rename = "serviceSettingID")]
    pub service_setting_id: String,
}

impl Validate for ServiceSettingConfigurationCreationInput {
    fn validate(&self) -> Result<(), Violation> {
        Rules::new()
            .required("value", &self.value)
            .required("serviceSettingID", &self.service_setting_id)
            .identifier("serviceSettingID", &self.service_setting_id)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceSettingConfigurationUpdateInput {
    pub value: Option<String>,
    pub notes: Option<String>,
}

impl Validate for ServiceSettingConfigurationUpdateInput {
    fn validate(&self) -> Result<(), Violation> {
        Rules::new()
            .at_least_one(&[self.value.is_some(), self.notes.is_some()])
            .length("value", &self.value, 1, 1024)
            .finish()
    }
}

pub struct ServiceSettingConfigurations;

impl Resource for ServiceSettingConfigurations {
    type Record = ServiceSettingConfiguration;
    type CreateInput = ServiceSettingConfigurationCreationInput;
    type UpdateInput = ServiceSettingConfigurationUpdateInput;

    const KIND: ResourceKind = ResourceKind::ServiceSettingConfiguration;
    const COLLECTION_PATH: &'static str = "/settings/configurations";
    const ID_PARAM: &'static str = "serviceSettingConfigurationID";
    const HOUSEHOLD_SCOPED: bool = true;

    fn create(
        id: String,
        input: ServiceSettingConfigurationCreationInput,
        scope: &Scope,
        session: &SessionContext,
    ) -> ServiceSettingConfiguration {
        ServiceSettingConfiguration {
            id,
            value: input.value,
            notes: input.notes,
            service_setting_id: input.service_setting_id,
            belongs_to_user: session.user_id().to_string(),
            belongs_to_household: scope.household_id().unwrap_or_default().to_string(),
            lifecycle: Lifecycle::created_now(),
        }
    }

    fn update(record: &mut ServiceSettingConfiguration, input: ServiceSettingConfigurationUpdateInput) {
        super::assign(&mut record.value, input.value);
        super::assign(&mut record.notes, input.notes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::testing;

    #[test]
    fn belongs_to_the_active_household_and_caller() {
        let session = testing::session();
        let scope = Scope::new(Some(session.active_household_id.clone()), Vec::new());
        let input = ServiceSettingConfigurationCreationInput {
            value: "dark".to_string(),
            notes: String::new(),
            service_setting_id: "setting-1".to_string(),
        };
        assert!(input.validate().is_ok());

        let record = ServiceSettingConfigurations::create("c1".to_string(), input, &scope, &session);
        assert_eq!(record.belongs_to_household, "household-1");
        assert_eq!(record.belongs_to_user, "user-1");
        assert_eq!(record.scope_path(), scope.path());
    }

    #[test]
    fn setting_id_must_be_an_identifier() {
        let input = ServiceSettingConfigurationCreationInput {
            value: "dark".to_string(),
            notes: String::new(),
            service_setting_id: "not valid!".to_string(),
        };
        assert_eq!(input.validate().unwrap_err().field, "serviceSettingID");
    }
}
