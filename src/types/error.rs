//! Error types for the admin service
//!
//! Every request-scoped failure is one of these variants; the HTTP layer maps
//! each to a status code and a `{error, details}` body.

use hyper::StatusCode;

/// Main error type for admin service operations
#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Failed to parse file: {0}")]
    Parse(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Confirmation required: {0}")]
    ConfirmationRequired(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Object storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AdminError {
    /// Convert error to HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Parse(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::ConfirmationRequired(_) => StatusCode::PRECONDITION_REQUIRED,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Storage(_) => StatusCode::BAD_GATEWAY,
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short, client-facing summary placed in the `error` field.
    ///
    /// Client-caused errors carry their own message.
    pub fn summary(&self) -> &str {
        match self {
            Self::Unauthorized(m) | Self::BadRequest(m) | Self::Validation(m) => m.as_str(),
            Self::Parse(_) => "Failed to parse file",
            Self::Auth(_) => "Unauthorized",
            Self::NotFound(_) => "Not found",
            Self::Conflict(_) => "Conflict",
            Self::ConfirmationRequired(_) => "Confirmation required",
            Self::PayloadTooLarge(_) => "Payload too large",
            Self::Database(_) => "Database operation failed",
            Self::Storage(_) => "Object storage operation failed",
            Self::Config(_) => "Server misconfigured",
            Self::Internal(_) => "Internal server error",
        }
    }

    /// Detail message for the `details` field.
    ///
    /// Auth failures carry no detail on the wire.
    pub fn details(&self) -> Option<&str> {
        match self {
            Self::Unauthorized(_) | Self::Auth(_) | Self::BadRequest(_) | Self::Validation(_) => None,
            Self::Parse(m)
            | Self::NotFound(m)
            | Self::Conflict(m)
            | Self::ConfirmationRequired(m)
            | Self::PayloadTooLarge(m)
            | Self::Database(m)
            | Self::Storage(m)
            | Self::Config(m)
            | Self::Internal(m) => Some(m.as_str()),
        }
    }
}

// Implement From conversions for common error types

impl From<std::io::Error> for AdminError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for AdminError {
    fn from(err: serde_json::Error) -> Self {
        Self::BadRequest(format!("JSON error: {}", err))
    }
}

impl From<hyper::Error> for AdminError {
    fn from(err: hyper::Error) -> Self {
        Self::Internal(format!("HTTP error: {}", err))
    }
}

impl From<mongodb::error::Error> for AdminError {
    fn from(err: mongodb::error::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<bson::ser::Error> for AdminError {
    fn from(err: bson::ser::Error) -> Self {
        Self::Database(format!("BSON serialization failed: {}", err))
    }
}

impl From<jsonwebtoken::errors::Error> for AdminError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        tracing::debug!(error = %err, "JWT rejected");
        Self::Unauthorized("Invalid token".to_string())
    }
}

impl From<multer::Error> for AdminError {
    fn from(err: multer::Error) -> Self {
        Self::BadRequest(format!("Invalid multipart body: {}", err))
    }
}

/// Result type alias for admin service operations
pub type Result<T> = std::result::Result<T, AdminError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AdminError::Parse("bad zip".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AdminError::Database("down".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AdminError::ConfirmationRequired("wipe".into()).status_code(),
            StatusCode::PRECONDITION_REQUIRED
        );
    }

    #[test]
    fn test_client_errors_carry_own_message() {
        let err = AdminError::Unauthorized("Invalid token".into());
        assert_eq!(err.summary(), "Invalid token");
        assert!(err.details().is_none());

        let err = AdminError::BadRequest("No file uploaded".into());
        assert_eq!(err.summary(), "No file uploaded");
        assert!(err.details().is_none());

        let err = AdminError::Database("connection reset".into());
        assert_eq!(err.details(), Some("connection reset"));
    }
}
