//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for McReport
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum McReportError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    /// Login rejected by the service. Not retryable without new credentials.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Business-level rejection reported through the overall status field.
    #[error("API returned status: {status} requestId: {request_id} ({message})")]
    ApiStatus { status: String, message: String, request_id: String },

    /// A non-paginating call path received a response that requires paging.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Malformed envelope, unexpected SOAP fault or missing response element.
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl McReportError {
    /// Build an [`McReportError::ApiStatus`] from the raw response fields.
    ///
    /// An empty status message falls back to the status itself so the error
    /// always carries something readable.
    pub fn api_status(
        status: impl Into<String>,
        message: impl Into<String>,
        request_id: impl Into<String>,
    ) -> Self {
        let status = status.into();
        let message = message.into();
        let message = if message.trim().is_empty() { status.clone() } else { message };
        Self::ApiStatus { status, message, request_id: request_id.into() }
    }

    /// Transport-level failures are the only retryable class; business
    /// responses and authentication failures are surfaced unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

/// Result type alias for McReport operations
pub type Result<T> = std::result::Result<T, McReportError>;
