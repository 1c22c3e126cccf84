//! Application error type mapping to HTTP status codes and envelope format.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use semdex_types::error::{IndexError, RepositoryError, SearchError};

use super::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Search request errors.
    Search(SearchError),
    /// Store/index request errors.
    Index(IndexError),
    /// Storage failures outside a search or index call.
    Repository(RepositoryError),
    /// Requested record does not exist.
    NotFound(String),
    /// Validation error.
    Validation(String),
}

impl From<SearchError> for AppError {
    fn from(e: SearchError) -> Self {
        AppError::Search(e)
    }
}

impl From<IndexError> for AppError {
    fn from(e: IndexError) -> Self {
        AppError::Index(e)
    }
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        AppError::Repository(e)
    }
}

impl AppError {
    /// Status code and machine-readable code for this error.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Search(e) if e.is_validation() => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
            }
            AppError::Index(IndexError::Validation(_)) | AppError::Validation(_) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
            }
            AppError::Repository(RepositoryError::NotFound) | AppError::NotFound(_) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND")
            }
            AppError::Search(_) | AppError::Index(_) | AppError::Repository(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR")
            }
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::Search(e) => e.to_string(),
            AppError::Index(e) => e.to_string(),
            AppError::Repository(e) => e.to_string(),
            AppError::NotFound(msg) | AppError::Validation(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = self.message();

        if status.is_server_error() {
            tracing::error!(code, %message, "Request failed");
        }

        let body = ApiResponse::error(code, &message, uuid::Uuid::now_v7().to_string(), 0);
        (status, Json(body)).into_response()
    }
}
