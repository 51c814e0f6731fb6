//! Error types for qam-server
//!
//! Input problems answer 400; a failed call to an external service answers
//! 500 and carries the upstream's raw error payload so the operator sees
//! what the service actually said.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{error, warn};

use crate::clients::ServiceError;
use crate::services::reload::ReloadError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// External service failure (500)
    #[error(transparent)]
    Upstream(#[from] ServiceError),

    /// Bulk replace failed or left rejected documents (500)
    #[error(transparent)]
    Reload(#[from] ReloadError),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// qam-common error
    #[error("Common error: {0}")]
    Common(#[from] qam_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, payload): (_, _, String, Option<Value>) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg, None),
            ApiError::Upstream(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "UPSTREAM_ERROR",
                err.to_string(),
                Some(err.payload()),
            ),
            ApiError::Reload(ReloadError::Service(ref err)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "UPSTREAM_ERROR",
                err.to_string(),
                Some(err.payload()),
            ),
            ApiError::Reload(
                ref err @ (ReloadError::DeleteRejected(ref rejected)
                | ReloadError::InsertRejected(ref rejected)),
            ) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "UPSTREAM_ERROR",
                err.to_string(),
                Some(json!(rejected)),
            ),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                msg,
                None,
            ),
            ApiError::Common(qam_common::Error::InvalidInput(msg)) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg, None)
            }
            ApiError::Common(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "COMMON_ERROR",
                err.to_string(),
                None,
            ),
        };

        if status.is_server_error() {
            error!(code = error_code, "{}", message);
        } else {
            warn!(code = error_code, "{}", message);
        }

        let mut body = json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        });
        if let Some(payload) = payload {
            body["error"]["payload"] = payload;
        }

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
