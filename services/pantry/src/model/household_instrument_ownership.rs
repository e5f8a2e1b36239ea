use crate::auth::session::SessionContext;
use crate::resource::{Lifecycle, Record, Resource, Scope};
use crate::validation::{Rules, Validate, Violation};
use pantry_common::ResourceKind;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HouseholdInstrumentOwnership {
    pub id: String,
    pub notes: String,
    pub quantity: u16,
    #[serde(rename = "validInstrumentID")]
    pub valid_instrument_id: String,
    pub belongs_to_household: String,
    #[serde(flatten)]
    pub lifecycle: Lifecycle,
}

impl Record for HouseholdInstrumentOwnership {
    const TABLE: &'static str = "household_instrument_ownerships";

    record_accessors!();

    fn scope_path(&self) -> Vec<String> {
        vec![self.belongs_to_household.clone()]
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct HouseholdInstrumentOwnershipCreationInput {
    pub notes: String,
    pub quantity: u16,
    #[serde(rename = "validInstrumentID")]
    pub valid_instrument_id: String,
}

impl Validate for HouseholdInstrumentOwnershipCreationInput {
    fn validate(&self) -> Result<(), Violation> {
        Rules::new()
            .required("validInstrumentID", &self.valid_instrument_id)
            .identifier("validInstrumentID", &self.valid_instrument_id)
            .range("quantity", Some(self.quantity), 1, u16::MAX)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct HouseholdInstrumentOwnershipUpdateInput {
    pub notes: Option<String>,
    pub quantity: Option<u16>,
}

impl Validate for HouseholdInstrumentOwnershipUpdateInput {
    fn validate(&self) -> Result<(), Violation> {
        Rules::new()
            .at_least_one(&[self.notes.is_some(), self.quantity.is_some()])
            .range("quantity", self.quantity, 1, u16::MAX)
            .finish()
    }
}

pub struct HouseholdInstrumentOwnerships;

impl Resource for HouseholdInstrumentOwnerships {
    type Record = HouseholdInstrumentOwnership;
    type CreateInput = HouseholdInstrumentOwnershipCreationInput;
    type UpdateInput = HouseholdInstrumentOwnershipUpdateInput;

    const KIND: ResourceKind = ResourceKind::HouseholdInstrumentOwnership;
    const COLLECTION_PATH: &'static str = "/households/instruments";
    const ID_PARAM: &'static str = "householdInstrumentOwnershipID";
    const HOUSEHOLD_SCOPED: bool = true;

    fn create(
        id: String,
        input: HouseholdInstrumentOwnershipCreationInput,
        scope: &Scope,
        _session: &SessionContext,
    ) -> HouseholdInstrumentOwnership {
        HouseholdInstrumentOwnership {
            id,
            notes: input.notes,
            quantity: input.quantity,
            valid_instrument_id: input.valid_instrument_id,
            belongs_to_household: scope.household_id().unwrap_or_default().to_string(),
            lifecycle: Lifecycle::created_now(),
        }
    }

    fn update(record: &mut HouseholdInstrumentOwnership, input: HouseholdInstrumentOwnershipUpdateInput) {
        super::assign(&mut record.notes, input.notes);
        super::assign(&mut record.quantity, input.quantity);
    }
}
