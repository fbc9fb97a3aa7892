//! Client configuration and secrets management

use crate::error::{ClientError, Result};
use crate::platform::Environment;

/// How the client authenticates itself at the token endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenEndpointAuthMethod {
    /// HTTP Basic with the form-encoded client id and secret
    #[default]
    ClientSecretBasic,
    /// Client id and secret in the request body
    ClientSecretPost,
}

impl TokenEndpointAuthMethod {
    fn parse(value: &str) -> Result<Self> {
        match value {
            "client_secret_basic" => Ok(Self::ClientSecretBasic),
            "client_secret_post" => Ok(Self::ClientSecretPost),
            other => Err(ClientError::config(format!(
                "unsupported token endpoint auth method '{}'",
                other
            ))),
        }
    }
}

/// HTTP method used for the userinfo request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserInfoMethod {
    #[default]
    Get,
    Post,
}

impl UserInfoMethod {
    fn parse(value: &str) -> Result<Self> {
        match value.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            _ => Err(ClientError::config(format!(
                "unsupported userinfo HTTP method '{}'",
                value
            ))),
        }
    }
}

/// Relying-party configuration loaded from environment
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Client identifier registered with the provider
    pub client_id: String,
    /// Client secret registered with the provider
    pub client_secret: String,
    /// Token endpoint URL
    pub token_endpoint: String,
    /// Userinfo endpoint URL, if the provider has one
    pub userinfo_endpoint: Option<String>,
    /// Redirect URI sent with the authorization request
    pub redirect_uri: String,
    pub token_endpoint_auth_method: TokenEndpointAuthMethod,
    pub userinfo_method: UserInfoMethod,
}

impl ClientConfig {
    /// Load configuration from platform environment
    pub fn from_env(env: &dyn Environment) -> Result<Self> {
        let token_endpoint = env
            .get_var("OIDC_TOKEN_ENDPOINT")
            .map_err(|_| ClientError::config("OIDC_TOKEN_ENDPOINT not configured"))?;
        validate_endpoint_url(&token_endpoint)?;

        let userinfo_endpoint = env.get_var("OIDC_USERINFO_ENDPOINT").ok();
        if let Some(endpoint) = &userinfo_endpoint {
            validate_endpoint_url(endpoint)?;
        }

        let token_endpoint_auth_method = match env.get_var("OIDC_TOKEN_ENDPOINT_AUTH_METHOD") {
            Ok(value) => TokenEndpointAuthMethod::parse(&value)?,
            Err(_) => TokenEndpointAuthMethod::default(),
        };

        let userinfo_method = match env.get_var("OIDC_USERINFO_HTTP_METHOD") {
            Ok(value) => UserInfoMethod::parse(&value)?,
            Err(_) => UserInfoMethod::default(),
        };

        Ok(Self {
            client_id: env
                .get_var("OIDC_CLIENT_ID")
                .map_err(|_| ClientError::config("OIDC_CLIENT_ID not configured"))?,
            client_secret: env
                .get_secret("OIDC_CLIENT_SECRET")
                .map_err(|_| ClientError::config("OIDC_CLIENT_SECRET secret not set"))?,
            token_endpoint,
            userinfo_endpoint,
            redirect_uri: env
                .get_var("OIDC_REDIRECT_URI")
                .map_err(|_| ClientError::config("OIDC_REDIRECT_URI not configured"))?,
            token_endpoint_auth_method,
            userinfo_method,
        })
    }
}

/// Validate a provider endpoint URL: HTTPS only, except for local development
fn validate_endpoint_url(endpoint: &str) -> Result<()> {
    let url = url::Url::parse(endpoint)
        .map_err(|_| ClientError::config(format!("invalid endpoint URL '{}'", endpoint)))?;

    let is_localhost = matches!(
        url.host_str(),
        Some("localhost") | Some("127.0.0.1") | Some("[::1]")
    );
    if url.scheme() != "https" && !is_localhost {
        return Err(ClientError::config(format!("endpoint '{}' must use HTTPS", endpoint)));
    }

    if url.fragment().is_some() {
        return Err(ClientError::config(format!(
            "endpoint '{}' must not have a fragment",
            endpoint
        )));
    }

    Ok(())
}
