//! Liveness and readiness probes.
//!
//! These sit outside the resource envelope and the session layer: probes
//! carry no credentials and expect a flat JSON body.
use crate::api::types::HealthResponse;
use crate::app::AppState;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

#[utoipa::path(
    get,
    path = "/_meta_/live",
    tag = "meta",
    responses(
        (status = 200, description = "Process is running", body = HealthResponse)
    )
)]
pub(crate) async fn live(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        backend: state.storage.backend_name().to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/_meta_/ready",
    tag = "meta",
    responses(
        (status = 200, description = "Storage is reachable", body = HealthResponse),
        (status = 500, description = "Storage is unavailable", body = HealthResponse)
    )
)]
pub(crate) async fn ready(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let backend = state.storage.backend_name().to_string();
    match state.storage.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok".to_string(),
                backend,
            }),
        ),
        Err(err) => {
            tracing::warn!(error = %err, %backend, "storage health check failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(HealthResponse {
                    status: "unavailable".to_string(),
                    backend,
                }),
            )
        }
    }
}
