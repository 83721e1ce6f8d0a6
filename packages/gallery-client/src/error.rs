//! Error types for the gallery client.

use thiserror::Error;

/// Result type for gallery client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Gallery client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration error (missing base URL, client could not be built)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network error (connection refused, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// The server rejected the session cookie (401)
    #[error("Not authenticated")]
    Unauthorized,

    /// Any other non-2xx response
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Parse error (invalid JSON, unexpected response shape)
    #[error("Parse error: {0}")]
    Parse(String),
}

impl ClientError {
    /// Whether this error means "no valid session" rather than a transport problem.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Unauthorized)
    }
}
