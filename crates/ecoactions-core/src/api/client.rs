//! reqwest-backed `AuthBackend`.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{header, Client};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Config;

use super::{AuthBackend, AuthError, RawResponse};

/// API client for the PlantATree backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(&config.api_base_url, config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl AuthBackend for ApiClient {
    async fn post_json(
        &self,
        path: &str,
        body: &Value,
        bearer: Option<&str>,
    ) -> Result<RawResponse, AuthError> {
        let url = self.url(path);

        let mut request = self
            .client
            .post(&url)
            .header(header::ACCEPT, "application/json")
            .json(body);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            warn!(url = %url, error = %e, "Request failed before a response arrived");
            AuthError::from(e)
        })?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.text().await?;

        debug!(url = %url, status, "Auth request completed");

        Ok(RawResponse {
            status,
            content_type,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let client = ApiClient::new("http://localhost:5000/", Duration::from_secs(5))
            .expect("client should build");
        assert_eq!(client.base_url(), "http://localhost:5000");
        assert_eq!(
            client.url("/api/auth/login"),
            "http://localhost:5000/api/auth/login"
        );
        assert_eq!(
            client.url("api/auth/login"),
            "http://localhost:5000/api/auth/login"
        );
    }

    #[test]
    fn test_from_config_uses_configured_base_url() {
        let config = Config {
            api_base_url: "https://eco.example.org".to_string(),
            ..Config::default()
        };
        let client = ApiClient::from_config(&config).expect("client should build");
        assert_eq!(client.base_url(), "https://eco.example.org");
    }
}
