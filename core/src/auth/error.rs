//! Authentication-response failures

use serde::Serialize;
use thiserror::Error;

use crate::error::ClientError;
use crate::oidc::ErrorResponse;

/// Why an authentication response was rejected.
///
/// Every variant ends the current authentication attempt.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuthResponseError {
    /// The provider answered with an OAuth error (authorization or token endpoint)
    #[error("provider returned error '{}'", .0.error)]
    ErrorResponse(ErrorResponse),

    #[error("unexpected state in authentication response")]
    UnexpectedState,

    #[error("unexpected nonce in ID token")]
    UnexpectedNonce,

    #[error("mismatching subject: {0}")]
    MismatchingSubject(String),

    /// Token or userinfo call failed
    #[error(transparent)]
    Transport(#[from] ClientError),
}

impl AuthResponseError {
    /// Get the error key for this error
    pub fn error_key(&self) -> &'static str {
        match self {
            Self::ErrorResponse(_) => "error_response",
            Self::UnexpectedState => "unexpected_state",
            Self::UnexpectedNonce => "unexpected_nonce",
            Self::MismatchingSubject(_) => "mismatching_subject",
            Self::Transport(e) => e.error_key(),
        }
    }

    /// The provider's error payload, if that is what failed the attempt
    pub fn error_response(&self) -> Option<&ErrorResponse> {
        match self {
            Self::ErrorResponse(response) => Some(response),
            _ => None,
        }
    }
}

/// Serializable error body for callers that render failed authentication
/// attempts
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

impl From<&AuthResponseError> for ErrorBody {
    fn from(err: &AuthResponseError) -> Self {
        Self {
            error: err.error_key().to_string(),
            message: err.to_string(),
        }
    }
}
