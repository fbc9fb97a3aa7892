//! Native platform implementations
//!
//! Implements core platform traits using native Rust libraries:
//! - HttpClient: reqwest
//! - Environment: std::env, with secrets optionally read from mounted files

use async_trait::async_trait;
use std::time::Duration;

use oidc_auth_core::error::{ClientError, Result};
use oidc_auth_core::platform::{Environment, HttpClient, HttpResponse};

/// reqwest-based HTTP client
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Client whose requests fail once `timeout` has elapsed
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    async fn send(&self, builder: reqwest::RequestBuilder, method: &str) -> Result<HttpResponse> {
        let response = builder
            .send()
            .await
            .map_err(|e| ClientError::upstream(format!("HTTP {} failed: {}", method, e)))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| ClientError::upstream(format!("failed to read response: {}", e)))?
            .to_vec();

        tracing::debug!(status, method, "provider request completed");
        Ok(HttpResponse { status, body })
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse> {
        let mut builder = self.client.get(url);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        self.send(builder, "GET").await
    }

    async fn post(&self, url: &str, headers: &[(&str, &str)], body: &[u8]) -> Result<HttpResponse> {
        let mut builder = self.client.post(url).body(body.to_vec());
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        self.send(builder, "POST").await
    }
}

/// Process environment.
///
/// Secrets come from the variable itself or, failing that, from the file
/// named by `<NAME>_FILE` (container secret mounts).
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn get_var(&self, name: &str) -> Result<String> {
        std::env::var(name)
            .map_err(|_| ClientError::config(format!("environment variable '{}' not set", name)))
    }

    fn get_secret(&self, name: &str) -> Result<String> {
        if let Ok(value) = std::env::var(name) {
            return Ok(value);
        }

        let file_var = format!("{}_FILE", name);
        let path = std::env::var(&file_var).map_err(|_| {
            ClientError::config(format!("secret '{}' not found in environment", name))
        })?;

        std::fs::read_to_string(&path)
            .map(|contents| contents.trim_end().to_string())
            .map_err(|e| {
                ClientError::config(format!("failed to read secret file for '{}': {}", name, e))
            })
    }
}
