//! Authentication response processing
//!
//! Turns a parsed authorization response into an [`AuthenticationResult`]:
//! error and state checks, implicit/hybrid tokens, code exchange with nonce
//! check, userinfo fetch, and the subject cross-check.

use serde::Serialize;

use super::error::AuthResponseError;
use crate::oidc::{
    AuthorizationGrant, AuthorizationResponse, IdTokenClaims, TokenClient, TokenResponse,
    UserInfoClaims, UserInfoClient,
};

/// Everything learned about the authenticated end user.
///
/// Only [`process_auth_response`] builds one. It serializes for session
/// storage but deliberately cannot be deserialized into a "verified" result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthenticationResult {
    access_token: Option<String>,
    id_token_claims: Option<IdTokenClaims>,
    id_token_jwt: Option<String>,
    userinfo_claims: Option<UserInfoClaims>,
}

impl AuthenticationResult {
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn id_token_claims(&self) -> Option<&IdTokenClaims> {
        self.id_token_claims.as_ref()
    }

    /// Raw ID token, e.g. for use as `id_token_hint` at logout
    pub fn id_token_jwt(&self) -> Option<&str> {
        self.id_token_jwt.as_deref()
    }

    pub fn userinfo_claims(&self) -> Option<&UserInfoClaims> {
        self.userinfo_claims.as_ref()
    }
}

/// Bundles the provider collaborators used while processing responses
pub struct AuthResponseHandler<'a> {
    tokens: &'a dyn TokenClient,
    userinfo: &'a dyn UserInfoClient,
}

impl<'a> AuthResponseHandler<'a> {
    pub fn new(tokens: &'a dyn TokenClient, userinfo: &'a dyn UserInfoClient) -> Self {
        Self { tokens, userinfo }
    }

    /// See [`process_auth_response`]
    pub async fn process(
        &self,
        auth_response: &AuthorizationResponse,
        expected_state: &str,
        expected_nonce: Option<&str>,
    ) -> Result<AuthenticationResult, AuthResponseError> {
        process_auth_response(
            auth_response,
            expected_state,
            expected_nonce,
            self.tokens,
            self.userinfo,
        )
        .await
    }
}

/// Process an authorization response.
///
/// `expected_state` and `expected_nonce` are the values sent with the
/// authentication request. Collaborator failures are returned unmodified as
/// [`AuthResponseError::Transport`]; nothing is retried.
pub async fn process_auth_response(
    auth_response: &AuthorizationResponse,
    expected_state: &str,
    expected_nonce: Option<&str>,
    tokens: &dyn TokenClient,
    userinfo: &dyn UserInfoClient,
) -> Result<AuthenticationResult, AuthResponseError> {
    // 1. Provider errors and state
    let grant = classify(auth_response, expected_state)?;
    tracing::debug!(
        has_code = grant.code.is_some(),
        has_id_token = grant.id_token.is_some(),
        "authorization response accepted"
    );

    // 2. Implicit/hybrid flow may return tokens in the authorization response
    let mut access_token = grant.access_token.clone();
    let mut id_token_claims = grant.id_token.clone();
    let mut id_token_jwt = grant.id_token_jwt.clone();

    if let Some(claims) = &id_token_claims {
        check_nonce(claims, expected_nonce)?;
    }

    // 3. Code flow: tokens from the token endpoint are authoritative
    if let Some(code) = &grant.code {
        tracing::debug!("exchanging authorization code");

        let token_set = match tokens.exchange(code).await? {
            TokenResponse::Error(error_response) => {
                tracing::warn!(error = %error_response.error, "token endpoint returned an error");
                return Err(AuthResponseError::ErrorResponse(error_response));
            }
            TokenResponse::Success(token_set) => token_set,
        };

        access_token = token_set.access_token;

        if let Some(id_token) = token_set.id_token {
            log_id_token(&id_token);
            check_nonce(&id_token, expected_nonce)?;

            id_token_claims = Some(id_token);
            id_token_jwt = token_set.id_token_jwt;
        }
    }

    // 4. Userinfo
    tracing::debug!(has_access_token = access_token.is_some(), "fetching userinfo");
    let userinfo_claims = userinfo.fetch(access_token.as_deref()).await?;

    // 5. Both claim sets must describe the same end user
    if let (Some(id_claims), Some(info_claims)) = (&id_token_claims, &userinfo_claims) {
        if id_claims.sub != info_claims.sub {
            tracing::warn!("userinfo subject does not match ID token subject");
            return Err(AuthResponseError::MismatchingSubject(
                "the 'sub' of userinfo does not match the 'sub' of the ID token".to_string(),
            ));
        }
    }

    tracing::debug!(
        has_id_token = id_token_claims.is_some(),
        has_userinfo = userinfo_claims.is_some(),
        "authentication result assembled"
    );
    Ok(AuthenticationResult {
        access_token,
        id_token_claims,
        id_token_jwt,
        userinfo_claims,
    })
}

/// Provider errors take priority over the state check
fn classify<'r>(
    auth_response: &'r AuthorizationResponse,
    expected_state: &str,
) -> Result<&'r AuthorizationGrant, AuthResponseError> {
    let grant = match auth_response {
        AuthorizationResponse::Error(error_response) => {
            tracing::warn!(
                error = %error_response.error,
                "authorization response carries an error"
            );
            return Err(AuthResponseError::ErrorResponse(error_response.clone()));
        }
        AuthorizationResponse::Granted(grant) => grant,
    };

    if grant.state.as_deref() != Some(expected_state) {
        tracing::warn!("authorization response state does not match");
        return Err(AuthResponseError::UnexpectedState);
    }

    Ok(grant)
}

fn check_nonce(
    claims: &IdTokenClaims,
    expected_nonce: Option<&str>,
) -> Result<(), AuthResponseError> {
    if claims.nonce.as_deref() != expected_nonce {
        tracing::warn!("ID token nonce does not match");
        return Err(AuthResponseError::UnexpectedNonce);
    }
    Ok(())
}

/// Debug dump of the claims, without the nonce
fn log_id_token(claims: &IdTokenClaims) {
    match serde_json::to_value(claims) {
        Ok(mut json) => {
            if let Some(object) = json.as_object_mut() {
                object.remove("nonce");
            }
            tracing::debug!(claims = %json, "received ID token");
        }
        Err(e) => tracing::debug!("received ID token (claims not serializable: {})", e),
    }
}
