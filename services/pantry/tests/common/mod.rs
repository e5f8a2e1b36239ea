#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, header};
use pantry::api::codec::Encoding;
use pantry::api::pipeline::{PipelineSettings, ResourceService};
use pantry::api::routes;
use pantry::app::{self, AppState};
use pantry::auth::middleware::SessionResolver;
use pantry::auth::session::Role;
use pantry::auth::token::{DEFAULT_SESSION_TTL, SessionKeys};
use pantry::filter::{QueryFilter, QueryFilteredResult};
use pantry::model::service_setting::{ServiceSetting, ServiceSettings};
use pantry::publisher::{PublishError, Publisher};
use pantry::resource::Lifecycle;
use pantry::search::SearchIndex;
use pantry::store::{DataManager, Storage, StoreError, StoreResult};
use pantry::store::memory::InMemoryStore;
use pantry_common::events::DataChangeMessage;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const USER_ID: &str = "user-1";
pub const HOUSEHOLD_ID: &str = "household-1";
const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

pub fn keys() -> SessionKeys {
    SessionKeys::new("pantry", SECRET)
}

pub fn resolver() -> Arc<SessionResolver> {
    Arc::new(SessionResolver {
        keys: keys(),
        cookie_name: "pantry_session".to_string(),
    })
}

pub fn settings() -> PipelineSettings {
    PipelineSettings {
        default_encoding: Encoding::Json,
        max_body_bytes: 64 * 1024,
    }
}

/// Token for a regular user who administers `household`.
pub fn token_for(user_id: &str, household: &str) -> String {
    let mut household_roles = HashMap::new();
    household_roles.insert(household.to_string(), vec![Role::HouseholdAdmin]);
    keys()
        .mint(
            user_id,
            household,
            vec![Role::ServiceUser],
            household_roles,
            DEFAULT_SESSION_TTL,
        )
        .expect("mint")
}

pub fn user_token() -> String {
    token_for(USER_ID, HOUSEHOLD_ID)
}

pub fn admin_token() -> String {
    keys()
        .mint(
            "admin-1",
            HOUSEHOLD_ID,
            vec![Role::ServiceAdmin],
            HashMap::new(),
            DEFAULT_SESSION_TTL,
        )
        .expect("mint")
}

pub fn request(method: &str, uri: &str, token: Option<&str>, body: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request")
}

pub fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Request<Body> {
    request(method, uri, token, Some(&body.to_string()))
}

pub async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

pub async fn read_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    String::from_utf8(bytes.to_vec()).expect("utf8")
}

/// Full router over the in-memory backend.
pub fn memory_app(
    publisher: Arc<dyn Publisher>,
    search_index: Option<Arc<dyn SearchIndex>>,
) -> Router {
    app::build_router(AppState {
        storage: Storage::Memory(InMemoryStore::new()),
        publisher,
        search_index,
        session_resolver: resolver(),
        pipeline: settings(),
    })
}

/// Service-setting routes only, over a scripted store.
pub fn service_settings_app(store: Arc<ScriptedStore>, publisher: Arc<dyn Publisher>) -> Router {
    let service = ResourceService::<ServiceSettings>::new(store, publisher, None, settings());
    app::api_router(routes::resource_router(service), resolver())
}

pub fn service_setting(id: &str, name: &str) -> ServiceSetting {
    ServiceSetting {
        id: id.to_string(),
        name: name.to_string(),
        setting_type: "user".to_string(),
        description: "d".to_string(),
        default_value: Some("v".to_string()),
        enumeration: vec!["v".to_string()],
        admins_only: false,
        lifecycle: Lifecycle::created_now(),
    }
}

/// How every scripted store method answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Ok,
    NotFound,
    Fail,
}

/// Data manager with a canned reply and a call log.
pub struct ScriptedStore {
    reply: Reply,
    exists: bool,
    record: Mutex<Option<ServiceSetting>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedStore {
    pub fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            exists: true,
            record: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn holding(record: ServiceSetting) -> Arc<Self> {
        Arc::new(Self {
            reply: Reply::Ok,
            exists: true,
            record: Mutex::new(Some(record)),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn missing_on_exists() -> Arc<Self> {
        Arc::new(Self {
            reply: Reply::Ok,
            exists: false,
            record: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls").clone()
    }

    pub fn mutations(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call.as_str(), "create" | "update" | "archive"))
            .count()
    }

    pub fn stored(&self) -> Option<ServiceSetting> {
        self.record.lock().expect("record").clone()
    }

    fn log(&self, call: &str) {
        self.calls.lock().expect("calls").push(call.to_string());
    }

    fn check(&self) -> StoreResult<()> {
        match self.reply {
            Reply::Ok => Ok(()),
            Reply::NotFound => Err(StoreError::NotFound("service_settings".to_string())),
            Reply::Fail => Err(StoreError::Unexpected(anyhow::anyhow!("connection reset"))),
        }
    }

    fn page(&self, filter: &QueryFilter) -> QueryFilteredResult<ServiceSetting> {
        QueryFilteredResult {
            data: self.stored().into_iter().collect(),
            pagination: filter.to_pagination(),
        }
    }
}

#[async_trait]
impl DataManager<ServiceSetting> for ScriptedStore {
    async fn get(&self, _scope: &[String], id: &str) -> StoreResult<ServiceSetting> {
        self.log("get");
        self.check()?;
        self.stored()
            .filter(|record| record.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn exists(&self, _scope: &[String], _id: &str) -> StoreResult<bool> {
        self.log("exists");
        self.check()?;
        Ok(self.exists)
    }

    async fn list(
        &self,
        _scope: &[String],
        filter: &QueryFilter,
    ) -> StoreResult<QueryFilteredResult<ServiceSetting>> {
        self.log("list");
        self.check()?;
        Ok(self.page(filter))
    }

    async fn search(
        &self,
        _scope: &[String],
        _query: &str,
        filter: &QueryFilter,
    ) -> StoreResult<QueryFilteredResult<ServiceSetting>> {
        self.log("search");
        self.check()?;
        Ok(self.page(filter))
    }

    async fn get_by_ids(&self, _scope: &[String], _ids: &[String]) -> StoreResult<Vec<ServiceSetting>> {
        self.log("get_by_ids");
        self.check()?;
        Ok(Vec::new())
    }

    async fn create(&self, record: ServiceSetting) -> StoreResult<ServiceSetting> {
        self.log("create");
        self.check()?;
        *self.record.lock().expect("record") = Some(record.clone());
        Ok(record)
    }

    async fn update(&self, record: &ServiceSetting) -> StoreResult<()> {
        self.log("update");
        self.check()?;
        *self.record.lock().expect("record") = Some(record.clone());
        Ok(())
    }

    async fn archive(&self, _scope: &[String], _id: &str) -> StoreResult<()> {
        self.log("archive");
        self.check()?;
        *self.record.lock().expect("record") = None;
        Ok(())
    }
}

/// Publisher whose transport is always down.
#[derive(Debug, Default)]
pub struct FailingPublisher {
    attempts: AtomicUsize,
}

impl FailingPublisher {
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Publisher for FailingPublisher {
    async fn publish(&self, _message: &DataChangeMessage) -> Result<(), PublishError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(PublishError::Transport("broker unavailable".to_string()))
    }
}
