//! API error types with IntoResponse
//!
//! Every error is rendered as `{"error": <kind>, "message": <text>}`.
//! Internal errors carry a generic message; the full text rides along as an
//! [`InternalDetail`] response extension so the server can expose it in
//! development.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde_json::json;

use crate::models::ValidationError;
use crate::services::ServiceError;

/// Message sent to clients in place of internal error text
pub const GENERIC_INTERNAL_MESSAGE: &str = "an internal error occurred";

/// Full text of an internal error, attached to 500 responses.
#[derive(Debug, Clone)]
pub struct InternalDetail(pub String);

/// API error type with automatic HTTP status mapping
#[derive(Debug)]
pub enum ApiError {
    /// Validation failed (400)
    Validation(ValidationError),

    /// Resource not found (404)
    NotFound { resource: &'static str, id: String },

    /// Known path, unsupported method (405)
    MethodNotAllowed { method: String, path: String },

    /// Uniqueness violation (400)
    Conflict { message: String },

    /// Foreign key violation (400)
    Referential { message: String },

    /// Body is not valid JSON for the endpoint (400)
    InvalidBody { message: String },

    /// Internal error (500, logged)
    Internal { message: String },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::NotFound { .. } => "not_found",
            Self::MethodNotAllowed { .. } => "method_not_allowed",
            Self::Conflict { .. } => "conflict",
            Self::Referential { .. } => "referential_error",
            Self::InvalidBody { .. } => "invalid_body",
            Self::Internal { .. } => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.kind();

        let message = match self {
            Self::Validation(e) => e.to_string(),
            Self::NotFound { resource, id } => format!("{resource} '{id}' not found"),
            Self::MethodNotAllowed { method, path } => {
                format!("method {method} is not allowed on '{path}'")
            }
            Self::Conflict { message }
            | Self::Referential { message }
            | Self::InvalidBody { message } => message,
            Self::Internal { message } => {
                tracing::error!("Internal error: {}", message);
                let body = json!({ "error": kind, "message": GENERIC_INTERNAL_MESSAGE });
                return (status, Extension(InternalDetail(message)), Json(body)).into_response();
            }
        };

        (status, Json(json!({ "error": kind, "message": message }))).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Validation(e) => Self::Validation(e),
            ServiceError::NotFound { resource, id } => Self::NotFound {
                resource,
                id: id.to_string(),
            },
            ServiceError::Conflict(message) => Self::Conflict { message },
            ServiceError::Referential(message) => Self::Referential { message },
            e @ ServiceError::Storage(_) => Self::Internal {
                message: e.to_string(),
            },
        }
    }
}
