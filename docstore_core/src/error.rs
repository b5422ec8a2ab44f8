//! Application error types and handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    FileUpload(String),

    #[error("{0}")]
    FileSearch(String),

    #[error("Internal server error occurred")]
    Internal,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Attaches the request path so the error can be rendered as an API
    /// response body.
    pub fn at(self, path: &str) -> ApiError {
        ApiError {
            error: self,
            path: path.to_string(),
        }
    }
}

/// An [`AppError`] bound to the request path it occurred on.
#[derive(Debug)]
pub struct ApiError {
    error: AppError,
    path: String,
}

#[derive(Debug, Serialize)]
pub struct ApiErrorResponse {
    pub status: u16,
    pub message: String,
    pub path: String,
    pub timestamp: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self.error {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::FileUpload(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            // Search failures and anything unexpected surface only a fixed
            // message; the root cause has already been logged.
            AppError::FileSearch(_) | AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error occurred".to_string(),
            ),
            AppError::Other(err) => {
                tracing::error!("Unexpected error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(ApiErrorResponse {
            status: status.as_u16(),
            message,
            path: self.path,
            timestamp: response_timestamp(),
        });

        (status, body).into_response()
    }
}

/// Timestamp format shared by error and success envelopes.
pub fn response_timestamp() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
