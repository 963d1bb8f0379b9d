//! Error taxonomy for the gateway.
//!
//! `ApiError` is the handler-facing taxonomy and maps directly to HTTP
//! status codes. Notification-path failures never become `ApiError`;
//! they are logged and swallowed inside the notifier.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Handler-level error, rendered as `{message, data: null}` JSON.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or malformed input (400)
    #[error("validation failed: {0}")]
    Validation(String),

    /// No row matches the requested id (404)
    #[error("data not found")]
    NotFound,

    /// Query or transaction failure (500)
    #[error("storage error: {0}")]
    Storage(String),
}

impl ApiError {
    /// Validation failure with a field-level detail message.
    pub fn validation(detail: impl Into<String>) -> Self {
        Self::Validation(detail.into())
    }

    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message for the response envelope
    fn message(&self) -> &'static str {
        match self {
            Self::Validation(_) => "Invalid request",
            Self::NotFound => "Data not found",
            Self::Storage(_) => "Server Error",
        }
    }

    /// Render as a JSON response. Error detail is attached only when
    /// `expose_detail` is set (non-production mode).
    pub fn into_response_with(self, expose_detail: bool) -> Response {
        let body = if expose_detail {
            json!({
                "message": self.message(),
                "data": null,
                "error": self.to_string(),
            })
        } else {
            json!({
                "message": self.message(),
                "data": null,
            })
        };
        (self.status(), Json(body)).into_response()
    }
}

// Default rendering hides detail; handlers that know the configured
// mode call `into_response_with` through the shared state instead.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.into_response_with(false)
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => Self::NotFound,
            other => Self::Storage(other.to_string()),
        }
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Gateway-level errors (startup and wiring, not HTTP)
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Server socket bind error
    #[error("server bind error: {0}")]
    Bind(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::validation("city is required").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Storage("pool timed out".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_row_not_found_maps_to_404() {
        let err: ApiError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[test]
    fn test_messages_are_stable() {
        assert_eq!(ApiError::NotFound.message(), "Data not found");
        assert_eq!(ApiError::Storage("x".into()).message(), "Server Error");
    }
}
