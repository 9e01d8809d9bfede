//! Unified API error handling with structured responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use pricewire_protocol::{EventKind, InvalidEventError};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::auth::AdmissionError;
use crate::dispatch::DispatchError;
use crate::realtime::DeliveryError;

/// API error type with structured responses.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid event: {0}")]
    InvalidEvent(#[from] InvalidEventError),

    #[error("no handler registered for event kind '{0}'")]
    NoHandlerForKind(EventKind),

    #[error(transparent)]
    Admission(#[from] AdmissionError),

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidEvent(_) => StatusCode::BAD_REQUEST,
            Self::NoHandlerForKind(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Admission(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidEvent(_) => "INVALID_EVENT",
            Self::NoHandlerForKind(_) => "NO_HANDLER_FOR_KIND",
            Self::Admission(AdmissionError::MissingCredential) => "MISSING_CREDENTIAL",
            Self::Admission(AdmissionError::Unauthorized) => "UNAUTHORIZED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

/// Structured error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();
        let message = self.to_string();

        match &self {
            ApiError::Internal(msg) => {
                error!(error_code = code, message = %msg, "API error");
            }
            _ => {
                tracing::debug!(error_code = code, message = %message, "Client error");
            }
        }

        let body = ErrorResponse {
            error: message,
            code,
        };

        (status, Json(body)).into_response()
    }
}

/// Dispatch failures: an unmatched kind is the caller's problem, a handler
/// failure is ours.
impl From<DispatchError> for ApiError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::NoHandlerForKind(kind) => ApiError::NoHandlerForKind(kind),
            DispatchError::Handler(inner) => ApiError::Internal(format!("{inner:#}")),
        }
    }
}

impl From<DeliveryError> for ApiError {
    fn from(err: DeliveryError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;
