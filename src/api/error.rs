//! API Error Types
//!
//! Defines error types for the API layer and implements conversion
//! to HTTP responses with appropriate status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::identity::IdentityError;
use crate::store::StoreError;

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request validation failed
    #[error("Validation error: {0}")]
    Validation(String),

    /// No session header on a write
    #[error("Missing session: {0}")]
    Unauthorized(String),

    /// Store layer error
    #[error("{0}")]
    Store(#[from] StoreError),

    /// Identity service error
    #[error("{0}")]
    Identity(#[from] IdentityError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
    pub request_id: String,
}

/// Error details
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "MISSING_SESSION"),
            ApiError::Store(e) => match e {
                StoreError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
                StoreError::NotFound(_) => (StatusCode::NOT_FOUND, "ENTRY_NOT_FOUND"),
                StoreError::Forbidden(_) => (StatusCode::FORBIDDEN, "NOT_ENTRY_OWNER"),
                StoreError::Unavailable(_) => {
                    (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE")
                }
                StoreError::Remote { .. } => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "STORE_ERROR"),
            },
            ApiError::Identity(e) => match e {
                IdentityError::Rejected(_) => (StatusCode::BAD_REQUEST, "SESSION_REJECTED"),
                IdentityError::LimitReached(_) | IdentityError::Unavailable(_) => {
                    (StatusCode::SERVICE_UNAVAILABLE, "IDENTITY_UNAVAILABLE")
                }
            },
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let request_id = uuid::Uuid::new_v4().to_string();

        if status.is_server_error() {
            tracing::error!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "API error occurred"
            );
        } else {
            tracing::debug!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "Request rejected"
            );
        }

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: self.to_string(),
            },
            request_id,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ValidationError;

    #[test]
    fn test_store_error_status() {
        let cases = [
            (
                ApiError::from(StoreError::Validation(ValidationError::MissingName)),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::from(StoreError::NotFound("x".to_string())),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::from(StoreError::Forbidden("x".to_string())),
                StatusCode::FORBIDDEN,
            ),
            (
                ApiError::Unauthorized("no header".to_string()),
                StatusCode::UNAUTHORIZED,
            ),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }
}
