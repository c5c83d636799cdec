//! API error type and its HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use card_core::CardError;
use serde::Serialize;
use thiserror::Error;

use crate::metrics::record_validation_failure;
use crate::validation::ValidationError;

/// Result type for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors returned by HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Pipeline or template error.
    #[error(transparent)]
    Card(#[from] CardError),
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Human-readable message.
    pub error: String,
}

impl ApiError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Card(CardError::InvalidVCard(_)) => {
                StatusCode::BAD_REQUEST
            }
            Self::Card(CardError::UnknownTemplate(_)) => StatusCode::NOT_FOUND,
            Self::Card(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::Validation(err) => {
                record_validation_failure(err.kind());
                tracing::debug!(error = %err, "Rejected request");
            }
            Self::Card(err) if status.is_server_error() => {
                tracing::error!(error = %err, "Request failed");
            }
            Self::Card(err) => tracing::debug!(error = %err, "Request failed"),
        }
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(ValidationError::InvalidUrl).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(CardError::UnknownTemplate("x".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(CardError::InvalidVCard("x".into())).status(),
            StatusCode::BAD_REQUEST
        );
        let io = std::io::Error::other("disk");
        assert_eq!(
            ApiError::from(CardError::Io(io)).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_body_message() {
        let response = ApiError::from(CardError::UnknownTemplate("florist".into())).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
