//! oidc-auth-core: Platform-agnostic OpenID Connect relying-party logic
//!
//! This crate validates authentication responses and acquires tokens and
//! userinfo claims. It depends only on abstract platform traits (HttpClient,
//! Environment) and on narrow provider collaborators, never on a concrete
//! HTTP stack.

pub mod auth;
pub mod config;
pub mod error;
pub mod oidc;
pub mod platform;

#[cfg(test)]
pub mod test_support;
