//! Error types for gymlog-api
//!
//! Every handler returns [`ApiResult`]. Status mapping:
//! 400 malformed input (including rejected JSON bodies, paths and query
//! strings), 404 missing row, 409 uniqueness or usage conflict,
//! 500 anything else (with the stringified cause).

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use sqlx::error::ErrorKind;
use thiserror::Error;
use tracing::error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Several input problems reported together (400)
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Conflict (409) - duplicate name, row still in use
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Unclassified database failure (500)
    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) | ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Validation(_) => "VALIDATION_FAILED",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::Internal(_) => "INTERNAL_ERROR",
            ApiError::Database(_) => "DATABASE_ERROR",
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        let kind = match &err {
            sqlx::Error::Database(db_err) => Some(db_err.kind()),
            _ => None,
        };

        match kind {
            Some(ErrorKind::UniqueViolation) => {
                ApiError::Conflict("a row with the same unique value already exists".to_string())
            }
            Some(ErrorKind::ForeignKeyViolation) => {
                ApiError::Conflict("the row is referenced by or references other rows".to_string())
            }
            Some(ErrorKind::CheckViolation) | Some(ErrorKind::NotNullViolation) => {
                ApiError::BadRequest(err.to_string())
            }
            _ => match err {
                sqlx::Error::RowNotFound => ApiError::NotFound("row not found".to_string()),
                other => ApiError::Database(other),
            },
        }
    }
}

impl From<gymlog_common::Error> for ApiError {
    fn from(err: gymlog_common::Error) -> Self {
        use gymlog_common::Error;

        match err {
            Error::Database(e) => e.into(),
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            Error::Conflict(msg) => ApiError::Conflict(msg),
            other @ (Error::Io(_) | Error::Config(_) | Error::Internal(_)) => {
                ApiError::Internal(other.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        let body = match &self {
            ApiError::Validation(details) => Json(json!({
                "error": {
                    "code": self.code(),
                    "message": format!("{} error(s) in request", details.len()),
                    "details": details,
                }
            })),
            ApiError::NotFound(msg)
            | ApiError::BadRequest(msg)
            | ApiError::Conflict(msg)
            | ApiError::Internal(msg) => Json(json!({
                "error": { "code": self.code(), "message": msg }
            })),
            ApiError::Database(err) => Json(json!({
                "error": { "code": self.code(), "message": err.to_string() }
            })),
        };

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
