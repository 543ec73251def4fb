// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::database::DatabaseError;
use crate::filter::error::FilterError;
use crate::validation::Violation;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    MalformedPayload(String),
    ValidationFailed(Vec<Violation>),
    MalformedId(String),
    BadRequest(String),
    RequestFailed(String),
    CustomerNotFound(String),
    InvalidCredentials(String),

    // 401 Unauthorized
    Unauthenticated(String),
    InvalidToken(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MalformedPayload(_)
            | ApiError::ValidationFailed(_)
            | ApiError::MalformedId(_)
            | ApiError::BadRequest(_)
            | ApiError::RequestFailed(_)
            | ApiError::CustomerNotFound(_)
            | ApiError::InvalidCredentials(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated(_) | ApiError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::ValidationFailed(_) => {
                "Some fields are required. Please fill in the required fields"
            }
            ApiError::MalformedPayload(msg)
            | ApiError::MalformedId(msg)
            | ApiError::BadRequest(msg)
            | ApiError::RequestFailed(msg)
            | ApiError::CustomerNotFound(msg)
            | ApiError::InvalidCredentials(msg)
            | ApiError::Unauthenticated(msg)
            | ApiError::InvalidToken(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::InternalServerError(msg)
            | ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::MalformedPayload(_) => "MALFORMED_PAYLOAD",
            ApiError::ValidationFailed(_) => "VALIDATION_FAILED",
            ApiError::MalformedId(_) => "MALFORMED_ID",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::RequestFailed(_) => "REQUEST_FAILED",
            ApiError::CustomerNotFound(_) => "CUSTOMER_NOT_FOUND",
            ApiError::InvalidCredentials(_) => "INVALID_CREDENTIALS",
            ApiError::Unauthenticated(_) => "UNAUTHENTICATED",
            ApiError::InvalidToken(_) => "INVALID_TOKEN",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let mut response = json!({
            "error": true,
            "message": self.message(),
            "code": self.error_code()
        });

        if let ApiError::ValidationFailed(violations) = self {
            response["errors"] = json!(violations);
        }

        response
    }
}

// Static constructor methods
impl ApiError {
    pub fn malformed_payload(message: impl Into<String>) -> Self {
        ApiError::MalformedPayload(message.into())
    }

    pub fn validation_failed(violations: Vec<Violation>) -> Self {
        ApiError::ValidationFailed(violations)
    }

    pub fn malformed_id(message: impl Into<String>) -> Self {
        ApiError::MalformedId(message.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn customer_not_found(message: impl Into<String>) -> Self {
        ApiError::CustomerNotFound(message.into())
    }

    pub fn invalid_credentials(message: impl Into<String>) -> Self {
        ApiError::InvalidCredentials(message.into())
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        ApiError::Unauthenticated(message.into())
    }

    pub fn invalid_token(message: impl Into<String>) -> Self {
        ApiError::InvalidToken(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Convert other error types to ApiError
impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::Duplicate(field) => {
                ApiError::conflict(format!(
                    "The {} is already taken. Please select another {}",
                    field, field
                ))
            }
            other => {
                // Don't expose driver errors to clients
                tracing::error!("Database error: {}", other);
                ApiError::RequestFailed("Failed to process request".to_string())
            }
        }
    }
}

impl From<FilterError> for ApiError {
    fn from(err: FilterError) -> Self {
        ApiError::bad_request(err.to_string())
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}
