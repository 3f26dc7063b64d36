//! Service error type and its HTTP mapping.
//!
//! Every failure funnels into [`Error`], whose `IntoResponse` impl renders
//! the wire contract: `{"error": ...}` for single-message failures and
//! `{"message": "Error de validación", "errors": [...]}` when the request
//! gate rejects a body. Internal causes are logged and collapsed into an
//! opaque 500.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::repository::{RepositoryError, RepositoryErrorKind};
use crate::validation::FieldError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// 404 with `{"error": message}`.
    #[error("{0}")]
    NotFound(String),

    /// 409 with `{"error": message}`.
    #[error("{0}")]
    Conflict(String),

    /// 422 with `{"error": message}` (stored-schema violations, malformed
    /// query parameters).
    #[error("{0}")]
    Validation(String),

    /// 422 with the request-gate envelope `{"message", "errors"}`.
    #[error("request validation failed on field {}", .0.field)]
    Rules(FieldError),

    /// 401 with `{"error": message}`.
    #[error("{0}")]
    Unauthorized(String),

    #[error("configuration error: {0}")]
    Config(Box<figment::Error>),

    #[error("token error: {0}")]
    Token(Box<jsonwebtoken::errors::Error>),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// The canonical 404 body.
    pub fn not_found() -> Self {
        Self::NotFound("No trobat".to_string())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl From<jsonwebtoken::errors::Error> for Error {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Self::Token(Box::new(err))
    }
}

impl From<surrealdb::Error> for Error {
    fn from(err: surrealdb::Error) -> Self {
        Self::Internal(format!("database error: {err}"))
    }
}

impl From<RepositoryError> for Error {
    fn from(err: RepositoryError) -> Self {
        match err.kind {
            RepositoryErrorKind::NotFound => Self::not_found(),
            RepositoryErrorKind::Duplicate => Self::Conflict(err.message),
            RepositoryErrorKind::Validation => Self::Validation(err.message),
            RepositoryErrorKind::Database => Self::Internal(err.message),
        }
    }
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Validation(_) | Self::Rules(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Config(_) | Self::Token(_) | Self::Io(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(status = %status, error = %self, "request failed");
            return (status, Json(json!({ "error": "Error intern del servidor" })))
                .into_response();
        }

        tracing::debug!(status = %status, error = %self, "request rejected");
        let body = match self {
            Self::Rules(field_error) => json!({
                "message": "Error de validación",
                "errors": [field_error],
            }),
            other => json!({ "error": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_kinds_map_to_statuses() {
        let not_found: Error = RepositoryError::not_found("product").into();
        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(not_found.to_string(), "No trobat");

        let duplicate: Error = RepositoryError::duplicate("SKU duplicat").into();
        assert_eq!(duplicate.status_code(), StatusCode::CONFLICT);

        let invalid: Error = RepositoryError::validation("price must be >= 0").into();
        assert_eq!(invalid.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

        let backend: Error = RepositoryError::database("connection reset").into();
        assert_eq!(backend.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn gate_rejections_are_unprocessable() {
        let err = Error::Rules(FieldError::new(
            "name",
            "El nombre debe tener mínimo 3 caracteres",
        ));
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
