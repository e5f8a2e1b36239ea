//! API error kinds and helpers.
//!
//! # Purpose and responsibility
//! Every failure the handler pipeline can report maps to exactly one
//! [`ErrorKind`]. The kind fixes the HTTP status and the envelope's `code`;
//! the message is the user-visible detail.
//!
//! # Key invariants and assumptions
//! - Only 400, 401, 404 and 500 are ever produced here.
//! - Store failures are logged server-side and reported with a generic
//!   message; their details never reach the client.
use crate::store::StoreError;
use crate::validation::Violation;
use axum::http::StatusCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    FetchingSessionContext,
    DecodingRequestInput,
    ValidatingRequestInput,
    DataNotFound,
    TalkingToDatabase,
}

impl ErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::FetchingSessionContext => "fetching_session_context",
            ErrorKind::DecodingRequestInput => "decoding_request_input",
            ErrorKind::ValidatingRequestInput => "validating_request_input",
            ErrorKind::DataNotFound => "data_not_found",
            ErrorKind::TalkingToDatabase => "talking_to_database",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ErrorKind::FetchingSessionContext => StatusCode::UNAUTHORIZED,
            ErrorKind::DecodingRequestInput | ErrorKind::ValidatingRequestInput => {
                StatusCode::BAD_REQUEST
            }
            ErrorKind::DataNotFound => StatusCode::NOT_FOUND,
            ErrorKind::TalkingToDatabase => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Structured API error returned by pipeline stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        self.kind.status()
    }
}

pub fn api_unauthenticated() -> ApiError {
    ApiError {
        kind: ErrorKind::FetchingSessionContext,
        message: "unauthenticated".to_string(),
    }
}

pub fn api_invalid_content(err: &dyn std::error::Error) -> ApiError {
    tracing::debug!(error = %err, "failed to decode request body");
    ApiError {
        kind: ErrorKind::DecodingRequestInput,
        message: "invalid_request_content".to_string(),
    }
}

pub fn api_validation_error(violation: &Violation) -> ApiError {
    ApiError {
        kind: ErrorKind::ValidatingRequestInput,
        message: violation.to_string(),
    }
}

pub fn api_not_found() -> ApiError {
    ApiError {
        kind: ErrorKind::DataNotFound,
        message: "not_found".to_string(),
    }
}

/// Logs the store failure and returns a generic database error.
pub fn api_database_error(context: &str, err: &StoreError) -> ApiError {
    tracing::error!(error = ?err, context, "pantry storage error");
    ApiError {
        kind: ErrorKind::TalkingToDatabase,
        message: "database_error".to_string(),
    }
}

/// Maps a read failure: `NotFound` becomes 404, anything else 500.
pub fn api_from_read(context: &str, err: StoreError) -> ApiError {
    match err {
        StoreError::NotFound(_) => api_not_found(),
        other => api_database_error(context, &other),
    }
}
