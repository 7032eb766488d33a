//! Error types for gateway polling.

use thiserror::Error;

/// Errors that can occur while polling the gateway.
///
/// Every variant is scoped to a single poll: callers report it for the
/// request that triggered the poll and carry on.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The gateway answered with a non-success status.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The gateway rejected the configured credentials.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Could not reach the gateway.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for response.
    #[error("Request timed out")]
    Timeout,

    /// The response body is not a valid component list.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// The HTTP client could not be constructed.
    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl GatewayError {
    /// True for failures that happened before a body could be parsed.
    pub fn is_fetch(&self) -> bool {
        matches!(
            self,
            GatewayError::Http(_)
                | GatewayError::Auth(_)
                | GatewayError::Connection(_)
                | GatewayError::Timeout
        )
    }

    /// True if the response arrived but could not be parsed.
    pub fn is_parse(&self) -> bool {
        matches!(self, GatewayError::Parse(_))
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::Parse(err.to_string())
    }
}

#[cfg(feature = "client")]
impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::Timeout
        } else if err.is_connect() {
            GatewayError::Connection(err.to_string())
        } else if err.is_builder() {
            GatewayError::Config(err.to_string())
        } else {
            GatewayError::Http(err.to_string())
        }
    }
}
