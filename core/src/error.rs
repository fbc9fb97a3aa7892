//! Collaborator error types
//!
//! Failures raised while talking to the provider (token endpoint, userinfo
//! endpoint, ID-token verification) or while loading configuration. These are
//! surfaced unmodified through the authentication pipeline.

use thiserror::Error;

/// Result type alias for collaborator operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Transport, parsing and configuration failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("invalid response: {message}")]
    InvalidResponse { message: String },

    #[error("upstream error: {message}")]
    Upstream { message: String },

    #[error("configuration error: {message}")]
    Config { message: String },
}

impl ClientError {
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Get the error key for this error
    pub fn error_key(&self) -> &'static str {
        match self {
            Self::InvalidResponse { .. } => "invalid_response",
            Self::Upstream { .. } => "upstream_error",
            Self::Config { .. } => "configuration_error",
        }
    }
}
