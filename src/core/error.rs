//! Error type system for the cartoon catalog
//!
//! This module provides:
//! - One error enum covering request and startup failures
//! - HTTP status code mapping
//! - The JSON envelopes clients receive for each failure class

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fallback message used when an internal failure carries no text of its own
pub const INTERNAL_ERROR_MESSAGE: &str = "internal server error!";

/// Main error type for the catalog service
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    // Lookup errors
    #[error("{0}")]
    NotFound(String),

    // API key errors
    #[error("api key is not provided!")]
    MissingApiKey,

    #[error("invalid api key")]
    InvalidApiKey,

    // Dataset errors
    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    // Anything unexpected while serving a request
    #[error("{0}")]
    Internal(String),
}

impl CatalogError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            CatalogError::NotFound(_) => StatusCode::NOT_FOUND,

            CatalogError::MissingApiKey | CatalogError::InvalidApiKey => StatusCode::FORBIDDEN,

            CatalogError::InvalidDataset(_)
            | CatalogError::IoError(_)
            | CatalogError::JsonError(_)
            | CatalogError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error type name used in log records
    pub fn error_type(&self) -> &'static str {
        match self {
            CatalogError::NotFound(_) => "NotFound",
            CatalogError::MissingApiKey => "MissingApiKey",
            CatalogError::InvalidApiKey => "InvalidApiKey",
            CatalogError::InvalidDataset(_) => "InvalidDataset",
            CatalogError::IoError(_) => "IoError",
            CatalogError::JsonError(_) => "JsonError",
            CatalogError::Internal(_) => "Internal",
        }
    }
}

/// Error envelope returned to clients
///
/// The shape depends on the failure class: forbidden responses carry only a
/// message, not-found responses add `success: false`, and internal failures
/// add `data: null` on top of that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// Envelope for a rejected credential
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: None,
            data: None,
        }
    }

    /// Envelope for a missing record
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: Some(false),
            data: None,
        }
    }

    /// Envelope for an unexpected failure, falling back to a generic message
    pub fn internal(message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            INTERNAL_ERROR_MESSAGE.to_string()
        } else {
            message
        };

        Self {
            message,
            success: Some(false),
            data: Some(serde_json::Value::Null),
        }
    }

    /// Create the envelope matching a CatalogError
    pub fn from_error(error: &CatalogError) -> Self {
        match error {
            CatalogError::NotFound(_) => Self::not_found(error.to_string()),
            CatalogError::MissingApiKey | CatalogError::InvalidApiKey => {
                Self::forbidden(error.to_string())
            }
            _ => Self::internal(error.to_string()),
        }
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Implement IntoResponse for CatalogError to enable automatic error handling in Axum
impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        let error_response = ErrorResponse::from_error(&self);

        if status_code.is_server_error() {
            tracing::error!(
                error_type = self.error_type(),
                status_code = %status_code,
                "Request failed: {}",
                self
            );
        } else {
            tracing::debug!(
                error_type = self.error_type(),
                status_code = %status_code,
                "Request rejected: {}",
                self
            );
        }

        (status_code, Json(error_response)).into_response()
    }
}

/// Result type alias for operations that can fail with CatalogError
pub type Result<T> = std::result::Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            CatalogError::NotFound("cartoon not found!".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(CatalogError::MissingApiKey.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(CatalogError::InvalidApiKey.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            CatalogError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            CatalogError::InvalidDataset("duplicate id 3".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_api_key_messages() {
        assert_eq!(CatalogError::MissingApiKey.to_string(), "api key is not provided!");
        assert_eq!(CatalogError::InvalidApiKey.to_string(), "invalid api key");
    }

    #[test]
    fn test_forbidden_envelope_has_only_message() {
        let value = serde_json::to_value(ErrorResponse::from_error(&CatalogError::InvalidApiKey)).unwrap();

        assert_eq!(value, serde_json::json!({ "message": "invalid api key" }));
    }

    #[test]
    fn test_not_found_envelope() {
        let error = CatalogError::NotFound("cartoon not found!".into());
        let value = serde_json::to_value(ErrorResponse::from_error(&error)).unwrap();

        assert_eq!(
            value,
            serde_json::json!({ "message": "cartoon not found!", "success": false })
        );
    }

    #[test]
    fn test_internal_envelope_carries_null_data() {
        let error = CatalogError::Internal("snapshot failed".into());
        let value = serde_json::to_value(ErrorResponse::from_error(&error)).unwrap();

        assert_eq!(value["message"], "snapshot failed");
        assert_eq!(value["success"], false);
        assert!(value.as_object().unwrap().contains_key("data"));
        assert!(value["data"].is_null());
    }

    #[test]
    fn test_internal_envelope_falls_back_to_generic_message() {
        let response = ErrorResponse::internal("   ");
        assert_eq!(response.message, INTERNAL_ERROR_MESSAGE);
    }

    #[tokio::test]
    async fn test_into_response_status_and_body() {
        let response = CatalogError::NotFound("cartoon not found!".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "cartoon not found!");
    }
}
