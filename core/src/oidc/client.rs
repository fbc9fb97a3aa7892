//! Provider collaborators
//!
//! Narrow traits for the calls the authentication pipeline makes, plus HTTP
//! implementations on top of the platform [`HttpClient`].

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};

use super::claims::{IdTokenClaims, UserInfoClaims};
use super::response::{parse_token_response, TokenResponse};
use crate::config::{ClientConfig, TokenEndpointAuthMethod, UserInfoMethod};
use crate::error::{ClientError, Result};
use crate::platform::HttpClient;

const USER_AGENT: &str = "oidc-auth-rust";

/// Exchanges an authorization code at the token endpoint
#[async_trait(?Send)]
pub trait TokenClient {
    async fn exchange(&self, code: &str) -> Result<TokenResponse>;
}

/// Fetches claims from the userinfo endpoint.
///
/// `Ok(None)` means the provider returned nothing (or the call was skipped).
#[async_trait(?Send)]
pub trait UserInfoClient {
    async fn fetch(&self, access_token: Option<&str>) -> Result<Option<UserInfoClaims>>;
}

/// Turns a raw ID token into claims. Implementations are responsible for
/// signature, issuer, audience and expiry checks.
#[async_trait(?Send)]
pub trait IdTokenVerifier {
    async fn verify(&self, jwt: &str) -> Result<IdTokenClaims>;
}

/// Token endpoint client using the authorization_code grant
pub struct HttpTokenClient<'a> {
    config: &'a ClientConfig,
    http: &'a dyn HttpClient,
    verifier: &'a dyn IdTokenVerifier,
}

impl<'a> HttpTokenClient<'a> {
    pub fn new(
        config: &'a ClientConfig,
        http: &'a dyn HttpClient,
        verifier: &'a dyn IdTokenVerifier,
    ) -> Self {
        Self {
            config,
            http,
            verifier,
        }
    }
}

#[async_trait(?Send)]
impl TokenClient for HttpTokenClient<'_> {
    async fn exchange(&self, code: &str) -> Result<TokenResponse> {
        let mut form = url::form_urlencoded::Serializer::new(String::new());
        form.append_pair("grant_type", "authorization_code")
            .append_pair("code", code)
            .append_pair("redirect_uri", &self.config.redirect_uri);

        let mut auth_header = None;
        match self.config.token_endpoint_auth_method {
            TokenEndpointAuthMethod::ClientSecretBasic => {
                auth_header = Some(basic_auth_header(
                    &self.config.client_id,
                    &self.config.client_secret,
                ));
            }
            TokenEndpointAuthMethod::ClientSecretPost => {
                form.append_pair("client_id", &self.config.client_id)
                    .append_pair("client_secret", &self.config.client_secret);
            }
        }
        let body = form.finish();

        let mut headers = vec![
            ("Content-Type", "application/x-www-form-urlencoded"),
            ("Accept", "application/json"),
            ("User-Agent", USER_AGENT),
        ];
        if let Some(value) = &auth_header {
            headers.push(("Authorization", value.as_str()));
        }

        let response = self
            .http
            .post(&self.config.token_endpoint, &headers, body.as_bytes())
            .await
            .map_err(|e| ClientError::upstream(format!("failed to call token endpoint: {}", e)))?;

        parse_token_response(&response, self.verifier).await
    }
}

/// Userinfo endpoint client
pub struct HttpUserInfoClient<'a> {
    config: &'a ClientConfig,
    http: &'a dyn HttpClient,
}

impl<'a> HttpUserInfoClient<'a> {
    pub fn new(config: &'a ClientConfig, http: &'a dyn HttpClient) -> Self {
        Self { config, http }
    }
}

#[async_trait(?Send)]
impl UserInfoClient for HttpUserInfoClient<'_> {
    async fn fetch(&self, access_token: Option<&str>) -> Result<Option<UserInfoClaims>> {
        let (Some(endpoint), Some(access_token)) = (&self.config.userinfo_endpoint, access_token)
        else {
            tracing::debug!("skipping userinfo request");
            return Ok(None);
        };

        let auth_header = format!("Bearer {}", access_token);
        let headers = [
            ("Authorization", auth_header.as_str()),
            ("Accept", "application/json"),
            ("User-Agent", USER_AGENT),
        ];

        let response = match self.config.userinfo_method {
            UserInfoMethod::Get => self.http.get(endpoint, &headers).await,
            UserInfoMethod::Post => self.http.post(endpoint, &headers, &[]).await,
        }
        .map_err(|e| ClientError::upstream(format!("failed to call userinfo endpoint: {}", e)))?;

        if !response.is_success() {
            return Err(ClientError::upstream(format!(
                "userinfo endpoint returned HTTP {}",
                response.status
            )));
        }

        parse_userinfo_body(&response.body)
    }
}

/// An empty body and an empty JSON object both mean "no claims"
fn parse_userinfo_body(body: &[u8]) -> Result<Option<UserInfoClaims>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    let object: serde_json::Map<String, serde_json::Value> = serde_json::from_slice(body)
        .map_err(|e| ClientError::invalid_response(format!("invalid userinfo response: {}", e)))?;

    if object.is_empty() {
        return Ok(None);
    }

    serde_json::from_value(serde_json::Value::Object(object))
        .map(Some)
        .map_err(|e| ClientError::invalid_response(format!("invalid userinfo claims: {}", e)))
}

/// HTTP Basic credentials, form-encoding id and secret first
fn basic_auth_header(client_id: &str, client_secret: &str) -> String {
    let id: String = url::form_urlencoded::byte_serialize(client_id.as_bytes()).collect();
    let secret: String = url::form_urlencoded::byte_serialize(client_secret.as_bytes()).collect();
    format!("Basic {}", STANDARD.encode(format!("{}:{}", id, secret)))
}
