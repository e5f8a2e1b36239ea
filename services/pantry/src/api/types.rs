//! Response envelopes shared by every endpoint.
//!
//! Successful responses carry `details`, `data` and, for collections,
//! `pagination`. Failed responses carry `details` and `error`. A response
//! never carries both `data` and `error`.
use crate::filter::Pagination;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResponseDetails {
    pub trace_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_household_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub details: ResponseDetails,
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Internal failure kind, e.g. `validating_request_input`.
    pub code: String,
    /// User-visible detail, e.g. `not_found` or a validation violation.
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorEnvelope {
    pub details: ResponseDetails,
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub backend: String,
}
