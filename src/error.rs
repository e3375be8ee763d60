use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Postgres SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

/// Unified error type for the token-store service.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    // ── Resource Errors ─────────────────────────────────────────────────
    #[error("{0} not found")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    // ── Request Errors ──────────────────────────────────────────────────
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    // ── Internal ────────────────────────────────────────────────────────
    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
                return StoreError::Conflict(
                    "a token with this name already exists for this creator".into(),
                );
            }
        }
        tracing::error!("Database error: {e}");
        StoreError::Database(e.to_string())
    }
}

impl From<JsonRejection> for StoreError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(e) => StoreError::Validation(e.body_text()),
            JsonRejection::MissingJsonContentType(e) => {
                StoreError::UnsupportedMediaType(e.body_text())
            }
            other => StoreError::BadRequest(other.body_text()),
        }
    }
}

impl From<PathRejection> for StoreError {
    fn from(rejection: PathRejection) -> Self {
        StoreError::Validation(rejection.body_text())
    }
}

impl From<anyhow::Error> for StoreError {
    fn from(e: anyhow::Error) -> Self {
        StoreError::Internal(e.to_string())
    }
}

impl StoreError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            StoreError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            StoreError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            StoreError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
            StoreError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            StoreError::UnsupportedMediaType(_) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, "unsupported_media_type")
            }
            StoreError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
            StoreError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let body = json!({
            "error": {
                "code": code,
                "message": self.to_string(),
            }
        });

        (status, axum::Json(body)).into_response()
    }
}
