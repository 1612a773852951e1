//! API response types.

use ephemera_core::{EphemeraError, ErrorResponse};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

/// Message returned for every server-side failure.
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to render the page.";

/// JSON body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: ErrorResponse,
}

impl From<ErrorResponse> for ErrorBody {
    fn from(error: ErrorResponse) -> Self {
        Self {
            success: false,
            error,
        }
    }
}

/// Application error type for Axum.
///
/// Server-side failures never expose their cause; the client sees the public
/// message (or a generic one) while the cause is logged.
#[derive(Debug)]
pub struct AppError {
    pub error: EphemeraError,
    public_message: Option<&'static str>,
}

impl AppError {
    /// Replaces the client-facing message.
    #[must_use]
    pub fn with_message(error: EphemeraError, message: &'static str) -> Self {
        Self {
            error,
            public_message: Some(message),
        }
    }
}

impl From<EphemeraError> for AppError {
    fn from(error: EphemeraError) -> Self {
        Self {
            error,
            public_message: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.error.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut error_response = ErrorResponse::from_error(&self.error);
        if let Some(message) = self.public_message {
            error_response.message = message.to_string();
        } else if status.is_server_error() {
            error_response.message = GENERIC_FAILURE_MESSAGE.to_string();
        }

        if status.is_server_error() {
            error!(error = %self.error, status = %status.as_u16(), "Request failed");
        }

        let body = Json(ErrorBody::from(error_response));
        (status, body).into_response()
    }
}

/// Result type for Axum handlers.
pub type ApiResult<T> = Result<T, AppError>;
