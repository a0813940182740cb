use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::domain::DomainError;
use serde::Serialize;
use tracing::error;

#[derive(Debug, Serialize)]
struct ApiErrorBody {
    error: String,
}

/// Error returned by HTTP handlers, rendered as `{"error": message}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ApiErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(error: DomainError) -> Self {
        domain_error_to_api_error(error)
    }
}

/// Convert domain error to an HTTP error response
pub fn domain_error_to_api_error(error: DomainError) -> ApiError {
    match error {
        DomainError::ValidationError(msg) | DomainError::InvalidTrackingEventId(msg) => {
            ApiError::bad_request(msg)
        }

        DomainError::TrackingEventNotFound(id) => ApiError::new(
            StatusCode::NOT_FOUND,
            format!("tracking event not found: {}", id),
        ),

        DomainError::RepositoryError(e) => {
            error!(error = %format!("{:#}", e), "storage operation failed");
            ApiError::internal("storage operation failed")
        }

        DomainError::PhotoReadError(msg) => {
            error!(error = %msg, "failed to read uploaded photo");
            ApiError::internal("failed to read uploaded file")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_error_statuses() {
        let cases = [
            (
                DomainError::ValidationError("location: not set".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                DomainError::InvalidTrackingEventId("invalid id format".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                DomainError::TrackingEventNotFound("abc".to_string()),
                StatusCode::NOT_FOUND,
            ),
            (
                DomainError::RepositoryError(anyhow::anyhow!("pool timed out")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                DomainError::PhotoReadError("stream closed".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(domain_error_to_api_error(error).status, status);
        }
    }

    #[test]
    fn test_storage_details_are_not_exposed() {
        let api_error =
            domain_error_to_api_error(DomainError::RepositoryError(anyhow::anyhow!("password=hunter2")));
        assert!(!api_error.message.contains("hunter2"));
    }

    #[test]
    fn test_validation_message_passes_through() {
        let api_error = domain_error_to_api_error(DomainError::InvalidTrackingEventId(
            "invalid id format".to_string(),
        ));
        assert_eq!(api_error.message, "invalid id format");
    }
}
