//! Authentication response handling
//!
//! Validates the provider's answer to an authentication request and acquires
//! tokens and userinfo claims for the authenticated end user.

mod error;
mod handler;

pub use error::{AuthResponseError, ErrorBody};
pub use handler::{process_auth_response, AuthResponseHandler, AuthenticationResult};
