use serde_json::Value;
use thiserror::Error;

use super::RawResponse;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Rejected by server: {0}")]
    ServerRejected(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Shown when a JSON rejection carries no `message` field
const DEFAULT_JSON_REJECTION: &str = "An error occurred with the request";

/// Shown when a plain-text rejection has an empty body
const DEFAULT_TEXT_REJECTION: &str = "An unexpected error occurred";

const CONNECTION_MESSAGE: &str = "An error occurred while connecting to the server";

impl AuthError {
    /// Truncate a response body to avoid surfacing excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    /// Build the rejection for a non-success response.
    ///
    /// JSON bodies contribute their `message` field; anything else is passed
    /// through as text. A body that claims to be JSON but does not parse is
    /// treated as text.
    pub fn from_response(response: &RawResponse) -> Self {
        if response.is_json() {
            if let Ok(value) = serde_json::from_str::<Value>(&response.body) {
                let message = json_message(&value)
                    .unwrap_or_else(|| DEFAULT_JSON_REJECTION.to_string());
                return AuthError::ServerRejected(Self::truncate_body(&message));
            }
        }

        let text = response.body.trim();
        if text.is_empty() {
            AuthError::ServerRejected(DEFAULT_TEXT_REJECTION.to_string())
        } else {
            AuthError::ServerRejected(Self::truncate_body(text))
        }
    }

    /// Rejection carried inside a 2xx body flagged with `"success": false`
    pub(crate) fn from_unsuccessful_payload(value: &Value) -> Self {
        let message = json_message(value).unwrap_or_else(|| DEFAULT_JSON_REJECTION.to_string());
        AuthError::ServerRejected(Self::truncate_body(&message))
    }

    /// Text suitable for a notification
    pub fn user_message(&self) -> String {
        match self {
            AuthError::PasswordMismatch => self.to_string(),
            AuthError::InvalidInput(message) | AuthError::ServerRejected(message) => {
                message.clone()
            }
            AuthError::ConnectionError(_) => CONNECTION_MESSAGE.to_string(),
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        AuthError::ConnectionError(err.to_string())
    }
}

fn json_message(value: &Value) -> Option<String> {
    value
        .get("message")
        .and_then(Value::as_str)
        .filter(|message| !message.is_empty())
        .map(str::to_string)
}
