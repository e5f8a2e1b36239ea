// Shared data types and small helpers used across crates.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("invalid id: {0}")]
    InvalidId(String),
    #[error("unknown resource kind: {0}")]
    UnknownResourceKind(String),
    #[error("invalid event type: {0}")]
    InvalidEventType(String),
}

pub mod ids {
    use super::{Error, Result};
    use uuid::Uuid;

    /// Maximum length accepted for an opaque identifier.
    pub const MAX_ID_LEN: usize = 64;

    // Random v4 ids; collision resistance is all callers rely on.
    pub fn new_id() -> String {
        Uuid::new_v4().simple().to_string()
    }

    /// Checks that `input` looks like an identifier this system would issue or accept.
    pub fn check_id(input: &str) -> Result<()> {
        let well_formed = !input.is_empty()
            && input.len() <= MAX_ID_LEN
            && input
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if well_formed {
            Ok(())
        } else {
            Err(Error::InvalidId(input.to_string()))
        }
    }
}

macro_rules! resource_kinds {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        /// Closed set of record kinds that emit data-change events.
        #[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
        pub enum ResourceKind {
            $($variant),+
        }

        impl ResourceKind {
            pub const ALL: &'static [ResourceKind] = &[$(ResourceKind::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(ResourceKind::$variant => $name),+
                }
            }
        }

        impl FromStr for ResourceKind {
            type Err = Error;

            fn from_str(input: &str) -> Result<Self> {
                match input {
                    $($name => Ok(ResourceKind::$variant),)+
                    other => Err(Error::UnknownResourceKind(other.to_string())),
                }
            }
        }
    };
}

resource_kinds! {
    ServiceSetting => "service_setting",
    ServiceSettingConfiguration => "service_setting_configuration",
    ValidMeasurementUnit => "valid_measurement_unit",
    ValidPreparation => "valid_preparation",
    ValidInstrument => "valid_instrument",
    Recipe => "recipe",
    RecipeStep => "recipe_step",
    MealPlan => "meal_plan",
    MealPlanOption => "meal_plan_option",
    MealPlanOptionVote => "meal_plan_option_vote",
    HouseholdInstrumentOwnership => "household_instrument_ownership",
    Webhook => "webhook",
}

impl ResourceKind {
    /// Kinds whose records live inside a household.
    pub fn is_household_owned(&self) -> bool {
        matches!(
            self,
            ResourceKind::ServiceSettingConfiguration
                | ResourceKind::MealPlan
                | ResourceKind::MealPlanOption
                | ResourceKind::MealPlanOptionVote
                | ResourceKind::HouseholdInstrumentOwnership
                | ResourceKind::Webhook
        )
    }

    /// Reference data curated by service administrators.
    pub fn is_reference_data(&self) -> bool {
        matches!(
            self,
            ResourceKind::ServiceSetting
                | ResourceKind::ValidMeasurementUnit
                | ResourceKind::ValidPreparation
                | ResourceKind::ValidInstrument
        )
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ChangeOp {
    Created,
    Updated,
    Archived,
}

impl ChangeOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeOp::Created => "created",
            ChangeOp::Updated => "updated",
            ChangeOp::Archived => "archived",
        }
    }
}

impl FromStr for ChangeOp {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self> {
        match input {
            "created" => Ok(ChangeOp::Created),
            "updated" => Ok(ChangeOp::Updated),
            "archived" => Ok(ChangeOp::Archived),
            other => Err(Error::InvalidEventType(other.to_string())),
        }
    }
}

/// Event discriminator: one per resource kind and change operation,
/// rendered on the wire as `<kind>.<op>` (e.g. `recipe.created`).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct EventType {
    pub kind: ResourceKind,
    pub op: ChangeOp,
}

impl EventType {
    pub fn new(kind: ResourceKind, op: ChangeOp) -> Self {
        Self { kind, op }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.kind.as_str(), self.op.as_str())
    }
}

impl FromStr for EventType {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self> {
        let (kind, op) = input
            .rsplit_once('.')
            .ok_or_else(|| Error::InvalidEventType(input.to_string()))?;
        let kind = kind
            .parse()
            .map_err(|_| Error::InvalidEventType(input.to_string()))?;
        Ok(Self { kind, op: op.parse()? })
    }
}

impl Serialize for EventType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EventType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

pub mod events {
    use super::EventType;
    use serde::{Deserialize, Serialize};
    use std::collections::BTreeMap;

    /// Payload emitted on the data-changes topic after a committed mutation.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct DataChangeMessage {
        pub event_type: EventType,
        pub user_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub household_id: Option<String>,
        // Path parameter name -> value for every parent scope.
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        pub scope: BTreeMap<String, String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub data: Option<serde_json::Value>,
    }
}

#[cfg(test)]
mod tests {
    use super::events::DataChangeMessage;
    use super::*;

    #[test]
    fn new_ids_are_unique_and_well_formed() {
        let a = ids::new_id();
        let b = ids::new_id();
        assert_ne!(a, b);
        assert!(ids::check_id(&a).is_ok());
        assert_eq!(a.len(), 32);
    }

    #[test]
    fn check_id_rejects_bad_input() {
        assert!(ids::check_id("").is_err());
        assert!(ids::check_id("has space").is_err());
        assert!(ids::check_id(&"a".repeat(ids::MAX_ID_LEN + 1)).is_err());
        assert!(ids::check_id("abc_DEF-123").is_ok());
    }

    #[test]
    fn resource_kinds_round_trip_through_strings() {
        for kind in ResourceKind::ALL {
            assert_eq!(kind.as_str().parse::<ResourceKind>(), Ok(*kind));
        }
        assert!("spaceship".parse::<ResourceKind>().is_err());
    }

    #[test]
    fn event_type_renders_kind_and_op() {
        let event = EventType::new(ResourceKind::MealPlanOption, ChangeOp::Archived);
        assert_eq!(event.to_string(), "meal_plan_option.archived");
        assert_eq!("meal_plan_option.archived".parse::<EventType>(), Ok(event));
        assert!("meal_plan_option".parse::<EventType>().is_err());
        assert!("meal_plan_option.exploded".parse::<EventType>().is_err());
    }

    #[test]
    fn data_change_message_omits_empty_fields() {
        let message = DataChangeMessage {
            event_type: EventType::new(ResourceKind::ServiceSetting, ChangeOp::Archived),
            user_id: "u1".to_string(),
            household_id: None,
            scope: Default::default(),
            data: None,
        };
        let json = serde_json::to_value(&message).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({"eventType": "service_setting.archived", "userId": "u1"})
        );
        let back: DataChangeMessage = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, message);
    }
}
