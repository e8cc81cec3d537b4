//! Service errors

use crate::security::AuthError;

/// Errors that can occur while serving a request
#[derive(Debug)]
pub enum ServiceError {
    /// No auth secret is available (deployment misconfigured)
    NotConfigured,
    /// Credential mismatch
    Unauthorized,
    /// Unknown item or file
    NotFound(String),
    /// Malformed or incomplete input
    Validation(String),
    /// Database error
    Database(String),
    /// Failed to start the service
    StartFailed(String),
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceError::NotConfigured => {
                write!(f, "server configuration error: auth password not set")
            }
            ServiceError::Unauthorized => write!(f, "unauthorized"),
            ServiceError::NotFound(e) => write!(f, "not found: {}", e),
            ServiceError::Validation(e) => write!(f, "invalid input: {}", e),
            ServiceError::Database(e) => write!(f, "database error: {}", e),
            ServiceError::StartFailed(e) => write!(f, "failed to start service: {}", e),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<rusqlite::Error> for ServiceError {
    fn from(e: rusqlite::Error) -> Self {
        ServiceError::Database(e.to_string())
    }
}

impl From<AuthError> for ServiceError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::NotConfigured => ServiceError::NotConfigured,
            AuthError::Mismatch => ServiceError::Unauthorized,
        }
    }
}
