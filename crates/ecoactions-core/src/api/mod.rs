//! Transport for the PlantATree authentication endpoints.
//!
//! `AuthBackend` is the seam the session client talks through. It returns
//! the status, content type and body of a response with the body read
//! exactly once, leaving interpretation to the caller. `ApiClient` is the
//! reqwest implementation used by the binaries.

pub mod client;
pub mod error;

use async_trait::async_trait;
use serde_json::Value;

pub use client::ApiClient;
pub use error::AuthError;

pub const REGISTER_PATH: &str = "/api/auth/register";
pub const LOGIN_PATH: &str = "/api/auth/login";
pub const LOGOUT_PATH: &str = "/api/auth/logout";

/// A fully-read HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl RawResponse {
    pub fn json(status: u16, body: &Value) -> Self {
        Self {
            status,
            content_type: Some("application/json".to_string()),
            body: body.to_string(),
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: Some("text/plain; charset=utf-8".to_string()),
            body: body.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.contains("application/json"))
    }
}

#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// POST a JSON body to `path`, optionally with a bearer token.
    ///
    /// Transport failures map to `AuthError::ConnectionError`; any HTTP
    /// status, including errors, comes back as `Ok`.
    async fn post_json(
        &self,
        path: &str,
        body: &Value,
        bearer: Option<&str>,
    ) -> Result<RawResponse, AuthError>;
}
