use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::controller::workflow::WorkflowError;
use crate::storage::StorageError;

#[derive(Error, Debug, Clone)]
pub enum AppError {
    #[error("db error: {0}")]
    Db(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("missing caller identity")]
    Unauthorized,
    #[error("{0}")]
    BadRequest(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Db(msg) => Self::Db(msg),
            StorageError::Conflict(msg) => Self::Conflict(msg),
            StorageError::NotFound(msg) => Self::NotFound(msg),
        }
    }
}

impl From<WorkflowError> for AppError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::Validation(messages) => Self::Validation(messages),
            WorkflowError::Storage(inner) => inner.into(),
            WorkflowError::NotFound(msg) => Self::NotFound(msg),
            WorkflowError::PlayerNotVisible(id) => Self::NotFound(format!("player {id}")),
            other => Self::BadRequest(other.to_string()),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::Validation(messages) => json!({"error": "validation failed", "errors": messages}),
            other => json!({"error": other.to_string()}),
        };
        if self.status_code().is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        HttpResponse::build(self.status_code()).json(body)
    }
}
