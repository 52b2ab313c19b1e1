use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

use service::errors::ServiceError;

/// Error body shared by every handler: `{"error": title, "detail": message}`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub title: String,
    pub detail: Option<String>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, title: impl Into<String>, detail: Option<String>) -> Self {
        Self { status, title: title.into(), detail }
    }

    pub fn unauthorized(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized", Some(detail.into()))
    }

    pub fn forbidden(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "Forbidden", Some(detail.into()))
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        let code = e.code();
        let (status, title) = match &e {
            ServiceError::NotFound(_) => (StatusCode::NOT_FOUND, "Not Found"),
            ServiceError::Conflict(_) => (StatusCode::CONFLICT, "Conflict"),
            ServiceError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "Validation Error"),
            ServiceError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            ServiceError::Forbidden(_) => (StatusCode::FORBIDDEN, "Forbidden"),
            ServiceError::Db(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Database Error"),
            ServiceError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal Error"),
        };
        if status.is_server_error() {
            error!(code, error = %e, "request failed");
        }
        let detail = match e {
            ServiceError::NotFound(m)
            | ServiceError::Conflict(m)
            | ServiceError::Validation(m)
            | ServiceError::Unauthorized(m)
            | ServiceError::Forbidden(m)
            | ServiceError::Db(m)
            | ServiceError::Internal(m) => m,
        };
        Self::new(status, title, Some(detail))
    }
}

impl From<service::auth::errors::AuthError> for JsonApiError {
    fn from(e: service::auth::errors::AuthError) -> Self {
        ServiceError::from(e).into()
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        (self.status, Json(serde_json::json!({"error": self.title, "detail": self.detail}))).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("migration failed: {0}")]
    Migration(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
