//! OIDC (OpenID Connect) module
//!
//! Response records, claim sets and the provider collaborators (token
//! endpoint, userinfo endpoint, ID-token verification).

mod claims;
mod client;
mod response;

pub use claims::{IdTokenClaims, UserInfoClaims};
pub use client::{
    HttpTokenClient, HttpUserInfoClient, IdTokenVerifier, TokenClient, UserInfoClient,
};
pub use response::{
    parse_authorization_response, parse_token_response, AuthorizationGrant, AuthorizationResponse,
    ErrorResponse, TokenResponse, TokenSet,
};
