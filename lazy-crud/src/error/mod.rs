//! Error types and error handling
//!
//! Every controller action returns `Result<Response, LazyError>`. Client
//! errors carry their message to the client; internal errors are logged with
//! `tracing` and answered with a generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use thiserror::Error;
use validator::ValidationErrors;

use crate::storage::StorageError;

/// lazy-crud error type
#[derive(Debug, Error)]
pub enum LazyError {
    /// Malformed filter, value or request (400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Record not found (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request validation failed (422)
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// View missing or failed to render
    #[error("View error: {0}")]
    View(String),

    /// Upload storage error
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Value could not be turned into JSON
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LazyError {
    /// Shorthand for [`LazyError::BadRequest`]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Not-found error for a resource and key
    pub fn not_found(resource: &str, id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{resource} {id}"))
    }

    /// HTTP status for this error
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Storage(StorageError::TooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Storage(StorageError::MissingFile) => StatusCode::BAD_REQUEST,
            Self::Database(_)
            | Self::View(_)
            | Self::Storage(_)
            | Self::Config(_)
            | Self::Io(_)
            | Self::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to clients
    #[must_use]
    pub fn public_message(&self) -> String {
        if self.status_code().is_server_error() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        }
    }
}

impl From<figment::Error> for LazyError {
    fn from(err: figment::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<handlebars::RenderError> for LazyError {
    fn from(err: handlebars::RenderError) -> Self {
        Self::View(err.to_string())
    }
}

impl From<handlebars::TemplateError> for LazyError {
    fn from(err: handlebars::TemplateError) -> Self {
        Self::View(err.to_string())
    }
}

/// Flatten validator errors into `{ field: [message, ...] }`
#[must_use]
pub fn field_errors(errors: &ValidationErrors) -> Map<String, Value> {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let messages = errs
                .iter()
                .map(|err| {
                    err.message
                        .as_ref()
                        .map_or_else(|| format!("{field} is invalid ({})", err.code), ToString::to_string)
                })
                .map(Value::String)
                .collect();
            (field.to_string(), Value::Array(messages))
        })
        .collect()
}

impl IntoResponse for LazyError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, %status, "request rejected");
        }

        let body = match &self {
            Self::Validation(errors) => json!({
                "error": "Validation failed",
                "errors": field_errors(errors),
            }),
            _ => json!({ "error": self.public_message() }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::ValidationError;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            LazyError::bad_request("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            LazyError::not_found("Post", 1).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            LazyError::Database(sea_orm::DbErr::Custom("boom".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_serialization_failure_is_internal() {
        let err: LazyError = serde_json::from_str::<Value>("{").unwrap_err().into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Internal server error");
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err = LazyError::Database(sea_orm::DbErr::Custom("password=secret".into()));
        assert_eq!(err.public_message(), "Internal server error");

        let err = LazyError::bad_request("operation foo is not allowed");
        assert_eq!(err.public_message(), "Bad request: operation foo is not allowed");
    }

    #[test]
    fn test_field_errors() {
        let mut errors = ValidationErrors::new();
        let mut err = ValidationError::new("length");
        err.message = Some("title is too short".into());
        errors.add("title", err);
        errors.add("body", ValidationError::new("required"));

        let map = field_errors(&errors);
        assert_eq!(map["title"], json!(["title is too short"]));
        assert_eq!(map["body"], json!(["body is invalid (required)"]));
    }

    #[test]
    fn test_validation_response_status() {
        let response = LazyError::Validation(ValidationErrors::new()).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
