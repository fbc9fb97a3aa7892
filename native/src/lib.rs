//! oidc-auth-native: native platform implementations for oidc-auth-core
//!
//! Provides a reqwest-backed [`HttpClient`](oidc_auth_core::platform::HttpClient)
//! and an [`Environment`](oidc_auth_core::platform::Environment) reading the
//! process environment, for relying parties running on a regular tokio runtime.

mod platform;

pub use platform::{ProcessEnv, ReqwestHttpClient};
