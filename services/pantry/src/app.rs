//! HTTP application wiring.
//!
//! # Purpose
//! Builds the Axum router and defines the shared state every resource
//! service is constructed from.
//!
//! # Layout
//! - `/api/v1/...` resource routes, behind the session middleware.
//! - `/_meta_/live`, `/_meta_/ready` probes.
//! - `/docs` with the OpenAPI document at `/api/v1/openapi.json`.
use crate::api::openapi::ApiDoc;
use crate::api::pipeline::PipelineSettings;
use crate::api::{routes, system};
use crate::auth::middleware::{SessionResolver, attach_session};
use crate::observability;
use crate::publisher::Publisher;
use crate::search::SearchIndex;
use crate::store::Storage;
use axum::Router;
use axum::routing::get;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_opentelemetry::OpenTelemetrySpanExt;
use utoipa::OpenApi;

pub const API_PREFIX: &str = "/api/v1";
pub const OPENAPI_PATH: &str = "/api/v1/openapi.json";

#[derive(Clone)]
pub struct AppState {
    pub storage: Storage,
    pub publisher: Arc<dyn Publisher>,
    pub search_index: Option<Arc<dyn SearchIndex>>,
    pub session_resolver: Arc<SessionResolver>,
    pub pipeline: PipelineSettings,
}

/// Wraps resource routes in the session middleware and mounts them under
/// the API prefix.
pub fn api_router(routes: Router, resolver: Arc<SessionResolver>) -> Router {
    Router::new().nest(
        API_PREFIX,
        routes.layer(axum::middleware::from_fn_with_state(resolver, attach_session)),
    )
}

pub fn build_router(state: AppState) -> Router {
    let trace_layer =
        TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
            let parent = observability::trace_context_from_headers(request.headers());
            let span = tracing::info_span!(
                "http.request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version()
            );
            span.set_parent(parent);
            span
        });

    let meta = Router::new()
        .route("/_meta_/live", get(system::live))
        .route("/_meta_/ready", get(system::ready))
        .with_state(state.clone());

    api_router(
        routes::resource_routes(&state),
        Arc::clone(&state.session_resolver),
    )
    .merge(meta)
    .merge(
        utoipa_swagger_ui::SwaggerUi::new("/docs").url(OPENAPI_PATH, ApiDoc::openapi()),
    )
    .layer(trace_layer)
}
