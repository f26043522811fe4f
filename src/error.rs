// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    // 500 Internal Server Error
    InternalServerError(String),

    // 400 Bad Request (malformed or mis-shaped payload)
    BadRequest(String),

    // 401 Unauthorized (missing/invalid credentials)
    AuthError(String),

    // 403 Forbidden (caller is neither the enrolled student nor staff)
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 403, caller has no enrollment for the course
    NotEnrolled(String),

    // 403, assessment unpublished or outside its window
    AssessmentUnavailable(String),

    // 403, max attempts reached
    AttemptLimitExceeded(String),

    // 409, duplicate content completion
    AlreadyCompleted(String),

    // 409 Conflict (duplicate enrollment, capacity, version race)
    Conflict(String),
}

impl AppError {
    /// Stable machine-readable tag so clients can branch on
    /// anticipated conditions without parsing messages.
    fn kind(&self) -> &'static str {
        match self {
            AppError::InternalServerError(_) => "internal_error",
            AppError::BadRequest(_) => "validation_error",
            AppError::AuthError(_) => "auth_error",
            AppError::Forbidden(_) => "forbidden",
            AppError::NotFound(_) => "not_found",
            AppError::NotEnrolled(_) => "not_enrolled",
            AppError::AssessmentUnavailable(_) => "assessment_unavailable",
            AppError::AttemptLimitExceeded(_) => "attempt_limit_exceeded",
            AppError::AlreadyCompleted(_) => "already_completed",
            AppError::Conflict(_) => "conflict",
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

/// Implements `IntoResponse` for `AppError`.
/// Converts the error into a JSON response with appropriate HTTP status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let (status, error_message) = match self {
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::AuthError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::Forbidden(msg)
            | AppError::NotEnrolled(msg)
            | AppError::AssessmentUnavailable(msg)
            | AppError::AttemptLimitExceeded(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::AlreadyCompleted(msg) | AppError::Conflict(msg) => {
                (StatusCode::CONFLICT, msg)
            }
        };
        let body = Json(json!({
            "error": error_message,
            "kind": kind,
        }));

        (status, body).into_response()
    }
}

/// Converts `sqlx::Error` into `AppError::InternalServerError`.
/// Allows using `?` operator on database queries.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(err.to_string())
    }
}
