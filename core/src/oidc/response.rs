//! Authorization and token endpoint responses
//!
//! Wire responses are parsed into explicit records here, so the pipeline never
//! has to look up keys in loosely typed maps.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::claims::IdTokenClaims;
use super::client::IdTokenVerifier;
use crate::error::{ClientError, Result};
use crate::platform::HttpResponse;

/// OAuth 2.0 error response reported by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_uri: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

/// Parsed authorization response from the redirect query or fragment
#[derive(Debug, Clone, PartialEq)]
pub enum AuthorizationResponse {
    /// The provider reported an error instead of a grant
    Error(ErrorResponse),
    Granted(AuthorizationGrant),
}

/// Successful authorization response.
///
/// `code` is present for the code and hybrid flows, tokens for the implicit
/// and hybrid flows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AuthorizationGrant {
    pub state: Option<String>,
    pub code: Option<String>,
    pub access_token: Option<String>,
    pub id_token: Option<IdTokenClaims>,
    pub id_token_jwt: Option<String>,
}

/// Parsed token endpoint response
#[derive(Debug, Clone, PartialEq)]
pub enum TokenResponse {
    Error(ErrorResponse),
    Success(TokenSet),
}

/// Tokens issued by the token endpoint
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TokenSet {
    pub access_token: Option<String>,
    pub id_token: Option<IdTokenClaims>,
    pub id_token_jwt: Option<String>,
}

/// Token endpoint body as sent on the wire
#[derive(Deserialize)]
struct RawTokenResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<serde_json::Value>,
    #[serde(default)]
    error_uri: Option<serde_json::Value>,
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
}

/// Parse the form-encoded parameters of a redirect (query string or fragment).
///
/// A leading `?` or `#` is ignored. An `id_token` parameter is verified with
/// `verifier`; the raw value is kept as `id_token_jwt`.
pub async fn parse_authorization_response(
    input: &str,
    verifier: &dyn IdTokenVerifier,
) -> Result<AuthorizationResponse> {
    let input = input
        .strip_prefix('?')
        .or_else(|| input.strip_prefix('#'))
        .unwrap_or(input);

    let mut params: HashMap<String, String> = HashMap::new();
    for (key, value) in url::form_urlencoded::parse(input.as_bytes()) {
        if params.insert(key.to_string(), value.to_string()).is_some() {
            return Err(ClientError::invalid_response(format!(
                "duplicate authorization response parameter '{}'",
                key
            )));
        }
    }

    if let Some(error) = params.remove("error") {
        return Ok(AuthorizationResponse::Error(ErrorResponse {
            error,
            error_description: params.remove("error_description"),
            error_uri: params.remove("error_uri"),
            state: params.remove("state"),
        }));
    }

    let id_token_jwt = params.remove("id_token");
    let id_token = match &id_token_jwt {
        Some(jwt) => Some(verifier.verify(jwt).await?),
        None => None,
    };

    Ok(AuthorizationResponse::Granted(AuthorizationGrant {
        state: params.remove("state"),
        code: params.remove("code"),
        access_token: params.remove("access_token"),
        id_token,
        id_token_jwt,
    }))
}

/// Parse a token endpoint HTTP response.
///
/// A JSON body carrying `error` is a provider-reported error regardless of the
/// status code; any other non-2xx status is an upstream failure.
pub async fn parse_token_response(
    response: &HttpResponse,
    verifier: &dyn IdTokenVerifier,
) -> Result<TokenResponse> {
    let raw: Option<RawTokenResponse> = response.json().ok();

    if let Some(RawTokenResponse {
        error: Some(error),
        error_description,
        error_uri,
        ..
    }) = raw
    {
        return Ok(TokenResponse::Error(ErrorResponse {
            error,
            error_description: error_description.and_then(lenient_string),
            error_uri: error_uri.and_then(lenient_string),
            state: None,
        }));
    }

    if !response.is_success() {
        return Err(ClientError::upstream(format!(
            "token endpoint returned HTTP {}",
            response.status
        )));
    }

    let raw =
        raw.ok_or_else(|| ClientError::invalid_response("token response is not valid JSON"))?;

    let id_token = match &raw.id_token {
        Some(jwt) => Some(verifier.verify(jwt).await?),
        None => None,
    };

    Ok(TokenResponse::Success(TokenSet {
        access_token: raw.access_token,
        id_token,
        id_token_jwt: raw.id_token,
    }))
}

/// Optional error fields keep whatever the provider sent; non-string values
/// are kept as their JSON text.
fn lenient_string(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}
