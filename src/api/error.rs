//! API error types and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::types::ErrorResponse;
use crate::engine::EngineError;

/// Errors that can occur while serving the API.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    /// Failed to bind to address.
    #[error("Failed to bind to {address}: {source}")]
    BindError {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// Server error.
    #[error("Server error: {0}")]
    ServerError(#[source] std::io::Error),

    /// Request body failed validation.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The engine could not complete the request.
    #[error("Internal error: {0}")]
    Internal(#[source] EngineError),
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        if err.is_validation() {
            Self::InvalidRequest(err.to_string())
        } else {
            Self::Internal(err)
        }
    }
}

impl ApiError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::BindError { .. } | Self::ServerError(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::InvalidRequest(reason) => reason.clone(),
            other => {
                tracing::error!(error = %other, "Request failed");
                "Internal server error".to_string()
            }
        };
        (status, Json(ErrorResponse::new(message))).into_response()
    }
}
