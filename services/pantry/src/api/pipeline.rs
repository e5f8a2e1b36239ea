//! The resource handler pipeline.
//!
//! # Purpose
//! One generic implementation of create, read, list, search, update and
//! archive, instantiated once per [`Resource`]. Entities contribute types and
//! a few constants; every request runs the same fixed sequence of stages.
//!
//! # Stage order
//! 1. Open the handler span and start the timer.
//! 2. Session context. Missing → 401. Bodies of unauthenticated callers are
//!    never read.
//! 3. Decode the body (create/update). Empty, malformed, oversized or of an
//!    unsupported media type → 400 `decoding_request_input`.
//! 4. Validate the body → 400 `validating_request_input`.
//! 5. Resolve the belongs-to scope from the path and the session. A blank
//!    parent id, or no active household for household-owned resources → 404.
//! 6. Update: `get` the record (404 / 500) and apply the input. The merged
//!    record (or, on create, the new one) must pass `Resource::check` → 400.
//! 7. Archive: `exists` (false or not-found → 404, failure → 500).
//! 8. Mutate. Any failure → 500. Create assigns the id before this call.
//! 9. Publish the data-change message and maintain the search index. Both
//!    are best-effort and never alter the response.
//! 10. Encode the envelope: 201 for create, 200 otherwise.
//!
//! # Cancellation
//! Step 9 runs on a spawned task that the handler awaits. If the client goes
//! away after step 8, the task still runs to completion.
use crate::api::codec::Encoding;
use crate::api::error::{
    ApiError, api_database_error, api_from_read, api_invalid_content, api_not_found,
    api_unauthenticated, api_validation_error,
};
use crate::api::types::{ApiResponse, ErrorBody, ErrorEnvelope, ResponseDetails};
use crate::auth::session::SessionContext;
use crate::filter::{Pagination, QueryFilter, QueryFilteredResult};
use crate::observability;
use crate::publisher::Publisher;
use crate::resource::{Record, Resource, Scope};
use crate::search::{self, SearchIndex};
use crate::store::{DataManager, StoreError};
use crate::validation::Validate;
use axum::body::Body;
use axum::extract::{FromRequestParts, Path, Request, State};
use axum::http::request::Parts;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use pantry_common::events::DataChangeMessage;
use pantry_common::{ChangeOp, EventType, ids};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    List,
    Search,
    Update,
    Archive,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::List => "list",
            Operation::Search => "search",
            Operation::Update => "update",
            Operation::Archive => "archive",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PipelineSettings {
    pub default_encoding: Encoding,
    pub max_body_bytes: usize,
}

/// Capabilities one resource's handlers need, bound at startup.
pub struct ResourceService<R: Resource> {
    store: Arc<dyn DataManager<R::Record>>,
    publisher: Arc<dyn Publisher>,
    search_index: Option<Arc<dyn SearchIndex>>,
    settings: PipelineSettings,
    _resource: PhantomData<fn() -> R>,
}

/// Per-request response state: negotiated encoding and envelope details.
struct Exchange {
    encoding: Encoding,
    details: ResponseDetails,
}

impl Exchange {
    fn begin(parts_headers: &axum::http::HeaderMap, default: Encoding) -> Self {
        Self {
            encoding: Encoding::for_response(parts_headers, default),
            details: ResponseDetails {
                trace_id: observability::current_trace_id(),
                current_household_id: None,
            },
        }
    }

    fn success<T: Serialize>(
        &self,
        status: StatusCode,
        data: Option<T>,
        pagination: Option<Pagination>,
    ) -> Response {
        let body = ApiResponse {
            details: self.details.clone(),
            data,
            pagination,
        };
        self.encode(status, &body)
    }

    fn failure(&self, err: &ApiError) -> Response {
        let body = ErrorEnvelope {
            details: self.details.clone(),
            error: ErrorBody {
                code: err.kind.code().to_string(),
                message: err.message.clone(),
            },
        };
        self.encode(err.status(), &body)
    }

    fn encode<B: Serialize>(&self, status: StatusCode, body: &B) -> Response {
        match self.encoding.encode(body) {
            Ok(bytes) => (
                status,
                [(header::CONTENT_TYPE, self.encoding.content_type())],
                bytes,
            )
                .into_response(),
            Err(err) => {
                tracing::error!(error = %err, "failed to encode response body");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

async fn path_params(parts: &mut Parts) -> HashMap<String, String> {
    Path::<HashMap<String, String>>::from_request_parts(parts, &())
        .await
        .map(|Path(params)| params)
        .unwrap_or_default()
}

fn operation_span<R: Resource>(operation: Operation) -> Span {
    tracing::info_span!(
        "pantry.handler",
        resource = R::KIND.as_str(),
        operation = operation.as_str(),
        record_id = tracing::field::Empty,
        status = tracing::field::Empty,
    )
}

impl<R: Resource> ResourceService<R> {
    pub fn new(
        store: Arc<dyn DataManager<R::Record>>,
        publisher: Arc<dyn Publisher>,
        search_index: Option<Arc<dyn SearchIndex>>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            store,
            publisher,
            search_index,
            settings,
            _resource: PhantomData,
        }
    }

    async fn run(&self, operation: Operation, request: Request) -> Response {
        let started = Instant::now();
        let (mut parts, body) = request.into_parts();
        let mut exchange = Exchange::begin(&parts.headers, self.settings.default_encoding);
        let outcome = match operation {
            Operation::Create => self.create(&mut exchange, &mut parts, body).await,
            Operation::Read => self.read(&mut exchange, &mut parts).await,
            Operation::List => self.list(&mut exchange, &mut parts).await,
            Operation::Search => self.search(&mut exchange, &mut parts).await,
            Operation::Update => self.update(&mut exchange, &mut parts, body).await,
            Operation::Archive => self.archive(&mut exchange, &mut parts).await,
        };
        let response = match outcome {
            Ok(response) => response,
            Err(err) => {
                tracing::debug!(code = err.kind.code(), message = %err.message, "request failed");
                exchange.failure(&err)
            }
        };

        let status = response.status().as_u16();
        Span::current().record("status", status);
        metrics::counter!(
            "pantry_requests_total",
            "resource" => R::KIND.as_str(),
            "operation" => operation.as_str(),
            "status" => status.to_string()
        )
        .increment(1);
        metrics::histogram!(
            "pantry_request_duration_seconds",
            "resource" => R::KIND.as_str(),
            "operation" => operation.as_str()
        )
        .record(started.elapsed().as_secs_f64());
        response
    }

    /// Stage 2.
    fn session(
        &self,
        exchange: &mut Exchange,
        parts: &Parts,
    ) -> Result<SessionContext, ApiError> {
        let session =
            SessionContext::from_extensions(&parts.extensions).map_err(|_| api_unauthenticated())?;
        if !session.active_household_id.is_empty() {
            exchange.details.current_household_id = Some(session.active_household_id.clone());
        }
        Ok(session)
    }

    /// Stages 3 and 4.
    async fn decode_valid<T>(&self, parts: &Parts, body: Body) -> Result<T, ApiError>
    where
        T: DeserializeOwned + Validate,
    {
        let encoding = Encoding::for_request(&parts.headers, self.settings.default_encoding)
            .map_err(|err| api_invalid_content(&err))?;
        let bytes = axum::body::to_bytes(body, self.settings.max_body_bytes)
            .await
            .map_err(|err| api_invalid_content(&err))?;
        let input: T = encoding
            .decode(&bytes)
            .map_err(|err| api_invalid_content(&err))?;
        input
            .validate()
            .map_err(|violation| api_validation_error(&violation))?;
        Ok(input)
    }

    /// Stage 5.
    fn scope(
        &self,
        params: &HashMap<String, String>,
        session: &SessionContext,
    ) -> Result<Scope, ApiError> {
        let mut parents = Vec::with_capacity(R::PARENT_PARAMS.len());
        for name in R::PARENT_PARAMS {
            let value = params
                .get(*name)
                .filter(|value| !value.is_empty())
                .ok_or_else(api_not_found)?;
            parents.push((*name, value.clone()));
        }
        let household = if R::HOUSEHOLD_SCOPED {
            // Callers without an active household own no household records.
            if session.active_household_id.is_empty() {
                return Err(api_not_found());
            }
            Some(session.active_household_id.clone())
        } else {
            None
        };
        Ok(Scope::new(household, parents))
    }

    fn record_id(&self, params: &HashMap<String, String>) -> Result<String, ApiError> {
        let id = params
            .get(R::ID_PARAM)
            .filter(|value| !value.is_empty())
            .cloned()
            .ok_or_else(api_not_found)?;
        Span::current().record("record_id", id.as_str());
        Ok(id)
    }

    /// Stage 9: publish and reindex on a detached task, then wait for it.
    async fn announce(
        &self,
        op: ChangeOp,
        session: &SessionContext,
        scope: &Scope,
        id: &str,
        record: Option<&R::Record>,
    ) {
        let data = record.and_then(|record| match serde_json::to_value(record) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(error = %err, "failed to serialize record for data change message");
                None
            }
        });
        let message = DataChangeMessage {
            event_type: EventType::new(R::KIND, op),
            user_id: session.user_id().to_string(),
            household_id: scope.household_id().map(str::to_string),
            scope: scope.fields(),
            data: data.clone(),
        };
        let publisher = Arc::clone(&self.publisher);
        let index = if R::SEARCHABLE {
            self.search_index.clone()
        } else {
            None
        };
        let id = id.to_string();

        let task = tokio::spawn(
            async move {
                if let Err(err) = publisher.publish(&message).await {
                    tracing::warn!(
                        error = %err,
                        event_type = %message.event_type,
                        "failed to publish data change message"
                    );
                    metrics::counter!("pantry_publish_failures_total", "resource" => R::KIND.as_str())
                        .increment(1);
                }
                let Some(index) = index else {
                    return;
                };
                let outcome = match (op, data) {
                    (ChangeOp::Archived, _) => index.delete(R::KIND, &id).await,
                    (_, Some(document)) => index.index(R::KIND, &id, document).await,
                    (_, None) => Ok(()),
                };
                if let Err(err) = outcome {
                    tracing::warn!(error = %err, record_id = %id, "failed to update search index");
                }
            }
            .instrument(Span::current()),
        );
        if let Err(err) = task.await {
            tracing::warn!(error = %err, "data change task did not complete");
        }
    }

    async fn create(
        &self,
        exchange: &mut Exchange,
        parts: &mut Parts,
        body: Body,
    ) -> Result<Response, ApiError> {
        let session = self.session(exchange, parts)?;
        let input: R::CreateInput = self.decode_valid(parts, body).await?;
        let params = path_params(parts).await;
        let scope = self.scope(&params, &session)?;

        let id = ids::new_id();
        Span::current().record("record_id", id.as_str());
        let record = R::create(id, input, &scope, &session);
        R::check(&record).map_err(|violation| api_validation_error(&violation))?;
        let created = self
            .store
            .create(record)
            .await
            .map_err(|err| api_database_error("create", &err))?;

        self.announce(ChangeOp::Created, &session, &scope, created.id(), Some(&created))
            .await;
        Ok(exchange.success(StatusCode::CREATED, Some(&created), None))
    }

    async fn read(
        &self,
        exchange: &mut Exchange,
        parts: &mut Parts,
    ) -> Result<Response, ApiError> {
        let session = self.session(exchange, parts)?;
        let params = path_params(parts).await;
        let scope = self.scope(&params, &session)?;
        let id = self.record_id(&params)?;

        let record = self
            .store
            .get(&scope.path(), &id)
            .await
            .map_err(|err| api_from_read("get", err))?;
        Ok(exchange.success(StatusCode::OK, Some(&record), None))
    }

    async fn list(
        &self,
        exchange: &mut Exchange,
        parts: &mut Parts,
    ) -> Result<Response, ApiError> {
        let session = self.session(exchange, parts)?;
        let mut filter = QueryFilter::from_query(parts.uri.query());
        filter.include_archived &= session.is_service_admin_for(R::KIND);
        let params = path_params(parts).await;
        let scope = self.scope(&params, &session)?;

        let result = match self.store.list(&scope.path(), &filter).await {
            Ok(result) => result,
            Err(StoreError::NotFound(_)) => QueryFilteredResult::empty(&filter),
            Err(err) => return Err(api_database_error("list", &err)),
        };
        Ok(exchange.success(StatusCode::OK, Some(&result.data), Some(result.pagination)))
    }

    async fn search(
        &self,
        exchange: &mut Exchange,
        parts: &mut Parts,
    ) -> Result<Response, ApiError> {
        let session = self.session(exchange, parts)?;
        let mut filter = QueryFilter::from_query(parts.uri.query());
        filter.include_archived = false;
        let params = path_params(parts).await;
        let scope = self.scope(&params, &session)?;
        let query = filter.query.clone().unwrap_or_default();

        let outcome = search::search_records(
            self.store.as_ref(),
            self.search_index.as_deref(),
            R::KIND,
            &scope.path(),
            &query,
            &filter,
        )
        .await;
        let result = match outcome {
            Ok(result) => result,
            Err(StoreError::NotFound(_)) => QueryFilteredResult::empty(&filter),
            Err(err) => return Err(api_database_error("search", &err)),
        };
        Ok(exchange.success(StatusCode::OK, Some(&result.data), Some(result.pagination)))
    }

    async fn update(
        &self,
        exchange: &mut Exchange,
        parts: &mut Parts,
        body: Body,
    ) -> Result<Response, ApiError> {
        let session = self.session(exchange, parts)?;
        let input: R::UpdateInput = self.decode_valid(parts, body).await?;
        let params = path_params(parts).await;
        let scope = self.scope(&params, &session)?;
        let id = self.record_id(&params)?;

        let mut record = self
            .store
            .get(&scope.path(), &id)
            .await
            .map_err(|err| api_from_read("get", err))?;
        R::update(&mut record, input);
        R::check(&record).map_err(|violation| api_validation_error(&violation))?;
        record.lifecycle_mut().last_updated_at = Some(Utc::now());
        self.store
            .update(&record)
            .await
            .map_err(|err| api_database_error("update", &err))?;

        self.announce(ChangeOp::Updated, &session, &scope, &id, Some(&record))
            .await;
        Ok(exchange.success(StatusCode::OK, Some(&record), None))
    }

    async fn archive(
        &self,
        exchange: &mut Exchange,
        parts: &mut Parts,
    ) -> Result<Response, ApiError> {
        let session = self.session(exchange, parts)?;
        let params = path_params(parts).await;
        let scope = self.scope(&params, &session)?;
        let id = self.record_id(&params)?;
        let path = scope.path();

        match self.store.exists(&path, &id).await {
            Ok(true) => {}
            Ok(false) | Err(StoreError::NotFound(_)) => return Err(api_not_found()),
            Err(err) => return Err(api_database_error("exists", &err)),
        }
        self.store
            .archive(&path, &id)
            .await
            .map_err(|err| api_database_error("archive", &err))?;

        self.announce(ChangeOp::Archived, &session, &scope, &id, None)
            .await;
        Ok(exchange.success::<()>(StatusCode::OK, None, None))
    }
}

async fn handle<R: Resource>(
    service: Arc<ResourceService<R>>,
    operation: Operation,
    request: Request,
) -> Response {
    let span = operation_span::<R>(operation);
    async move { service.run(operation, request).await }
        .instrument(span)
        .await
}

pub async fn create_handler<R: Resource>(
    State(service): State<Arc<ResourceService<R>>>,
    request: Request,
) -> Response {
    handle(service, Operation::Create, request).await
}

pub async fn read_handler<R: Resource>(
    State(service): State<Arc<ResourceService<R>>>,
    request: Request,
) -> Response {
    handle(service, Operation::Read, request).await
}

pub async fn list_handler<R: Resource>(
    State(service): State<Arc<ResourceService<R>>>,
    request: Request,
) -> Response {
    handle(service, Operation::List, request).await
}

pub async fn search_handler<R: Resource>(
    State(service): State<Arc<ResourceService<R>>>,
    request: Request,
) -> Response {
    handle(service, Operation::Search, request).await
}

pub async fn update_handler<R: Resource>(
    State(service): State<Arc<ResourceService<R>>>,
    request: Request,
) -> Response {
    handle(service, Operation::Update, request).await
}

pub async fn archive_handler<R: Resource>(
    State(service): State<Arc<ResourceService<R>>>,
    request: Request,
) -> Response {
    handle(service, Operation::Archive, request).await
}
