//! Error types for devlink.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value, json};
use thiserror::Error;

/// Application result type.
pub type AppResult<T> = Result<T, AppError>;

/// Application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // === Client Errors ===
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Field-level validation failures, keyed by field name.
    #[error("Validation failed: {0}")]
    Validation(Value),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Rate limited, retry after {retry_after}s")]
    RateLimited { retry_after: u64 },

    // === Server Errors ===
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            // 4xx Client Errors
            Self::NotFound(_) | Self::UserNotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,

            // 5xx Server Errors
            Self::Database(_) | Self::Config(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::RateLimited { .. } => "RATE_LIMITED",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to show to API clients.
    ///
    /// Server errors never leak the underlying infrastructure message.
    #[must_use]
    pub fn client_message(&self) -> String {
        match self {
            Self::NotFound(msg)
            | Self::UserNotFound(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::BadRequest(msg)
            | Self::Conflict(msg) => msg.clone(),
            Self::Validation(_) => "Validation failed".to_string(),
            Self::RateLimited { .. } => {
                "Too many requests from this IP, please try again later.".to_string()
            }
            Self::Database(_) | Self::Config(_) | Self::Internal(_) => {
                "Internal server error".to_string()
            }
        }
    }

    /// Structured details attached to the error, if any.
    #[must_use]
    pub fn details(&self) -> Option<Value> {
        match self {
            Self::Validation(fields) => Some(json!({ "errors": fields })),
            Self::RateLimited { retry_after } => Some(json!({ "retryAfter": retry_after })),
            _ => None,
        }
    }
}

/// Serializable snapshot of an [`AppError`], attached to error responses.
///
/// The API error boundary reads it back from the response extensions to log
/// request context and to decide whether debug information is exposed.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    /// HTTP status.
    pub status: StatusCode,
    /// Stable error code.
    pub code: &'static str,
    /// Client-facing message.
    pub message: String,
    /// Optional structured details.
    pub details: Option<Value>,
    /// Full internal rendering of the error.
    pub debug: String,
}

impl ErrorReport {
    /// Build the JSON body, optionally including the internal rendering.
    #[must_use]
    pub fn body(&self, include_debug: bool) -> Value {
        let mut body = Map::new();
        body.insert("message".to_string(), Value::String(self.message.clone()));
        body.insert("code".to_string(), Value::String(self.code.to_string()));
        if let Some(details) = &self.details {
            body.insert("details".to_string(), details.clone());
        }
        if include_debug {
            body.insert("debug".to_string(), Value::String(self.debug.clone()));
        }
        Value::Object(body)
    }
}

impl From<&AppError> for ErrorReport {
    fn from(err: &AppError) -> Self {
        Self {
            status: err.status_code(),
            code: err.error_code(),
            message: err.client_message(),
            details: err.details(),
            debug: format!("{err:?}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let report = ErrorReport::from(&self);

        let mut response = (report.status, Json(report.body(false))).into_response();
        if let Self::RateLimited { retry_after } = self {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(retry_after));
        }
        response.extensions_mut().insert(report);
        response
    }
}

// === From implementations ===

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        let fields: Map<String, Value> = err
            .field_errors()
            .into_iter()
            .map(|(field, errors)| {
                let message = errors
                    .iter()
                    .find_map(|e| e.message.as_ref().map(ToString::to_string))
                    .or_else(|| errors.first().map(|e| e.code.to_string()))
                    .unwrap_or_else(|| "invalid".to_string());
                (field.to_string(), Value::String(message))
            })
            .collect();

        Self::Validation(Value::Object(fields))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}
