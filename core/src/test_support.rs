//! Mock implementations of platform traits and provider collaborators for testing

use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex};

use crate::config::{ClientConfig, TokenEndpointAuthMethod, UserInfoMethod};
use crate::error::{ClientError, Result};
use crate::oidc::{
    IdTokenClaims, IdTokenVerifier, TokenClient, TokenResponse, UserInfoClaims, UserInfoClient,
};
use crate::platform::{Environment, HttpClient, HttpResponse};

/// Request captured by [`MockHttp`]
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Mock HTTP client with pre-configured responses
pub struct MockHttp {
    responses: Vec<(String, HttpResponse)>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockHttp {
    pub fn new(responses: Vec<(String, HttpResponse)>) -> Self {
        Self {
            responses,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn respond(
        &self,
        method: &'static str,
        url: &str,
        headers: &[(&str, &str)],
        body: &[u8],
    ) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(RecordedRequest {
            method,
            url: url.to_string(),
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            body: String::from_utf8_lossy(body).to_string(),
        });

        for (pattern, response) in &self.responses {
            if url.contains(pattern) {
                return Ok(response.clone());
            }
        }
        Err(ClientError::upstream(format!("no mock response for {} {}", method, url)))
    }
}

#[async_trait(?Send)]
impl HttpClient for MockHttp {
    async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse> {
        self.respond("GET", url, headers, &[])
    }

    async fn post(&self, url: &str, headers: &[(&str, &str)], body: &[u8]) -> Result<HttpResponse> {
        self.respond("POST", url, headers, body)
    }
}

/// Mock environment backed by an in-memory HashMap
pub struct MockEnv {
    vars: HashMap<String, String>,
    secrets: HashMap<String, String>,
}

impl MockEnv {
    pub fn new(vars: HashMap<String, String>, secrets: HashMap<String, String>) -> Self {
        Self { vars, secrets }
    }

    pub fn from_pairs(vars: &[(&str, &str)], secrets: &[(&str, &str)]) -> Self {
        fn to_map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        }
        Self::new(to_map(vars), to_map(secrets))
    }
}

impl Environment for MockEnv {
    fn get_var(&self, name: &str) -> Result<String> {
        self.vars
            .get(name)
            .cloned()
            .ok_or_else(|| ClientError::config(format!("variable '{}' not found", name)))
    }

    fn get_secret(&self, name: &str) -> Result<String> {
        self.secrets
            .get(name)
            .cloned()
            .ok_or_else(|| ClientError::config(format!("secret '{}' not found", name)))
    }
}

/// Verifier that accepts only pre-registered JWT strings
pub struct FakeVerifier {
    known: HashMap<String, IdTokenClaims>,
    calls: Mutex<usize>,
}

impl FakeVerifier {
    pub fn new(known: Vec<(&str, IdTokenClaims)>) -> Self {
        Self {
            known: known.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait(?Send)]
impl IdTokenVerifier for FakeVerifier {
    async fn verify(&self, jwt: &str) -> Result<IdTokenClaims> {
        *self.calls.lock().unwrap() += 1;
        self.known
            .get(jwt)
            .cloned()
            .ok_or_else(|| ClientError::invalid_response("ID token verification failed"))
    }
}

/// Token client returning a fixed response and recording exchanged codes
pub struct FakeTokenClient {
    response: Result<TokenResponse>,
    codes: Mutex<Vec<String>>,
}

impl FakeTokenClient {
    pub fn new(response: Result<TokenResponse>) -> Self {
        Self {
            response,
            codes: Mutex::new(Vec::new()),
        }
    }

    pub fn codes(&self) -> Vec<String> {
        self.codes.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.codes.lock().unwrap().len()
    }
}

#[async_trait(?Send)]
impl TokenClient for FakeTokenClient {
    async fn exchange(&self, code: &str) -> Result<TokenResponse> {
        self.codes.lock().unwrap().push(code.to_string());
        self.response.clone()
    }
}

/// Userinfo client returning a fixed response and recording access tokens
pub struct FakeUserInfoClient {
    response: Result<Option<UserInfoClaims>>,
    tokens: Mutex<Vec<Option<String>>>,
}

impl FakeUserInfoClient {
    pub fn new(response: Result<Option<UserInfoClaims>>) -> Self {
        Self {
            response,
            tokens: Mutex::new(Vec::new()),
        }
    }

    pub fn tokens(&self) -> Vec<Option<String>> {
        self.tokens.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.tokens.lock().unwrap().len()
    }
}

#[async_trait(?Send)]
impl UserInfoClient for FakeUserInfoClient {
    async fn fetch(&self, access_token: Option<&str>) -> Result<Option<UserInfoClaims>> {
        self.tokens.lock().unwrap().push(access_token.map(str::to_string));
        self.response.clone()
    }
}

pub fn id_token_claims(sub: &str, nonce: Option<&str>) -> IdTokenClaims {
    IdTokenClaims {
        iss: "https://op.example.com".to_string(),
        sub: sub.to_string(),
        aud: vec!["rp-client".to_string()],
        exp: 1706903600,
        iat: 1706900000,
        nonce: nonce.map(str::to_string),
        custom_claims: HashMap::new(),
    }
}

pub fn userinfo_claims(sub: &str) -> UserInfoClaims {
    UserInfoClaims {
        sub: sub.to_string(),
        custom_claims: HashMap::new(),
    }
}

pub fn test_config() -> ClientConfig {
    ClientConfig {
        client_id: "rp-client".to_string(),
        client_secret: "s3cret".to_string(),
        token_endpoint: "https://op.example.com/token".to_string(),
        userinfo_endpoint: Some("https://op.example.com/userinfo".to_string()),
        redirect_uri: "https://rp.example.com/redirect_uri".to_string(),
        token_endpoint_auth_method: TokenEndpointAuthMethod::ClientSecretBasic,
        userinfo_method: UserInfoMethod::Get,
    }
}

/// `tracing` output captured on the current thread while this is alive
pub struct CapturedLogs {
    buffer: Arc<Mutex<Vec<u8>>>,
    _guard: tracing::subscriber::DefaultGuard,
}

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock().unwrap()).to_string()
    }
}

struct LogWriter(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Install a debug-level subscriber for the current thread
pub fn capture_logs() -> CapturedLogs {
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let writer_buffer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || LogWriter(writer_buffer.clone()))
        .finish();

    CapturedLogs {
        buffer,
        _guard: tracing::subscriber::set_default(subscriber),
    }
}
