use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::validation::ValidationErrors;

/// RepositoryError
///
/// Failures surfaced by a `Repository` implementation.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    /// A unique constraint rejected the write. Carries the offending field name.
    #[error("unique constraint violated on `{0}`")]
    Conflict(&'static str),
}

/// ApiError
///
/// Every failure a handler (or the auth extractor) can produce. Each variant maps to exactly
/// one status code; see the `IntoResponse` impl for the JSON bodies.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unauthenticated")]
    Unauthorized,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("the given data was invalid")]
    Validation(ValidationErrors),
    #[error("malformed request body: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Repository(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            ApiError::Unauthorized => json!({ "message": "Unauthenticated." }),
            ApiError::NotFound(resource) => {
                json!({ "message": format!("No query results for {resource}.") })
            }
            ApiError::Validation(errors) => json!({
                "message": "The given data was invalid.",
                "errors": errors,
            }),
            ApiError::BadRequest(detail) => json!({ "message": detail }),
            ApiError::Repository(e) => {
                // Store details stay in the logs.
                tracing::error!(error = %e, "repository failure");
                json!({ "message": "Server Error" })
            }
            ApiError::Internal(detail) => {
                tracing::error!(error = %detail, "internal failure");
                json!({ "message": "Server Error" })
            }
        };
        (status, Json(body)).into_response()
    }
}
