//! Outbound webhooks a household registers for data-change events.
use crate::auth::session::SessionContext;
use crate::resource::{Lifecycle, Record, Resource, Scope};
use crate::validation::{Rules, Validate, Violation};
use pantry_common::{EventType, ResourceKind};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const CONTENT_TYPES: &[&str] = &["application/json", "application/yaml"];
pub const METHODS: &[&str] = &["GET", "POST", "PUT", "PATCH", "DELETE"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Webhook {
    pub id: String,
    pub name: String,
    pub content_type: String,
    pub url: String,
    pub method: String,
    pub events: Vec<String>,
    pub belongs_to_household: String,
    #[serde(flatten)]
    pub lifecycle: Lifecycle,
}

impl Record for Webhook {
    const TABLE: &'static str = "webhooks";

    record_accessors!();

    fn scope_path(&self) -> Vec<String> {
        vec![self.belongs_to_household.clone()]
    }
}

/// Every entry must name a known `kind.op` event.
fn events_known(events: &[String]) -> bool {
    events.iter().all(|event| event.parse::<EventType>().is_ok())
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct WebhookCreationInput {
    pub name: String,
    pub content_type: String,
    pub url: String,
    pub method: String,
    pub events: Vec<String>,
}

impl Validate for WebhookCreationInput {
    fn validate(&self) -> Result<(), Violation> {
        Rules::new()
            .required("name", &self.name)
            .required("url", &self.url)
            .url("url", &self.url)
            .required("contentType", &self.content_type)
            .one_of("contentType", &self.content_type, CONTENT_TYPES)
            .required("method", &self.method)
            .one_of("method", &self.method, METHODS)
            .not_empty("events", &self.events)
            .ensure("events", events_known(&self.events), "contains an unknown event type")
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct WebhookUpdateInput {
    pub name: Option<String>,
    pub content_type: Option<String>,
    pub url: Option<String>,
    pub method: Option<String>,
    pub events: Option<Vec<String>>,
}

impl Validate for WebhookUpdateInput {
    fn validate(&self) -> Result<(), Violation> {
        let events = self.events.as_deref().unwrap_or_default();
        Rules::new()
            .at_least_one(&[
                self.name.is_some(),
                self.content_type.is_some(),
                self.url.is_some(),
                self.method.is_some(),
                self.events.is_some(),
            ])
            .length("name", &self.name, 1, 256)
            .url("url", &self.url)
            .one_of("contentType", &self.content_type, CONTENT_TYPES)
            .one_of("method", &self.method, METHODS)
            .ensure(
                "events",
                self.events.as_ref().is_none_or(|events| !events.is_empty()),
                "cannot be empty",
            )
            .ensure("events", events_known(events), "contains an unknown event type")
            .finish()
    }
}

pub struct Webhooks;

impl Resource for Webhooks {
    type Record = Webhook;
    type CreateInput = WebhookCreationInput;
    type UpdateInput = WebhookUpdateInput;

    const KIND: ResourceKind = ResourceKind::Webhook;
    const COLLECTION_PATH: &'static str = "/webhooks";
    const ID_PARAM: &'static str = "webhookID";
    const HOUSEHOLD_SCOPED: bool = true;

    fn create(
        id: String,
        input: WebhookCreationInput,
        scope: &Scope,
        _session: &SessionContext,
    ) -> Webhook {
        Webhook {
            id,
            name: input.name,
            content_type: input.content_type,
            url: input.url,
            method: input.method,
            events: input.events,
            belongs_to_household: scope.household_id().unwrap_or_default().to_string(),
            lifecycle: Lifecycle::created_now(),
        }
    }

    fn update(record: &mut Webhook, input: WebhookUpdateInput) {
        super::assign(&mut record.name, input.name);
        super::assign(&mut record.content_type, input.content_type);
        super::assign(&mut record.url, input.url);
        super::assign(&mut record.method, input.method);
        super::assign(&mut record.events, input.events);
    }
}
