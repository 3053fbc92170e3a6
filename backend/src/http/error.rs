//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Diagnostic};

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Resource not found
    NotFound(String),
    /// Invalid request (validation error)
    BadRequest(String),
    /// Internal server error
    Internal(String),
    /// Error raised by the decision core
    Core(CoreError),
    /// Unknown scenario or severity
    UnknownScenario(Diagnostic),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", msg)),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg))
            }
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::new("INTERNAL_ERROR", msg),
            ),
            AppError::UnknownScenario(diagnostic) => (
                StatusCode::NOT_FOUND,
                ApiError::new(diagnostic.code(), diagnostic.to_string()),
            ),
            AppError::Core(e) => {
                let details = e.context().to_string();
                let (status, code) = match &e {
                    CoreError::InvalidInput { .. } => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
                    CoreError::InsufficientHistory { .. } => {
                        (StatusCode::UNPROCESSABLE_ENTITY, "INSUFFICIENT_HISTORY")
                    }
                    CoreError::Configuration { .. } => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "CONFIGURATION_ERROR")
                    }
                    CoreError::Export { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "EXPORT_ERROR"),
                };
                (status, ApiError::new(code, e.to_string()).with_details(details))
            }
        };

        (status, Json(error)).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        AppError::Core(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}
