use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::storage::KeyValueStore;

/// Storage key for the opaque session token
pub const TOKEN_KEY: &str = "token";

/// Storage key for the serialized user record
pub const USER_KEY: &str = "user";

/// User record as returned by the backend.
/// Fields this client does not model are kept verbatim in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some("admin")
    }

    /// Uppercase first letter of the username, used as an avatar placeholder
    pub fn initial(&self) -> Option<char> {
        self.username.chars().next().map(|c| c.to_ascii_uppercase())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub user: User,
}

pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Load the persisted session.
    ///
    /// A store holding only one of the two keys has no session.
    pub fn load(&self) -> Result<Option<Session>> {
        let token = self.store.get(TOKEN_KEY)?;
        let user = self.store.get(USER_KEY)?;

        match (token, user) {
            (Some(token), Some(user)) => {
                let user: User = serde_json::from_str(&user)
                    .context("Failed to parse stored user record")?;
                Ok(Some(Session { token, user }))
            }
            (None, None) => Ok(None),
            (token, user) => {
                debug!(
                    has_token = token.is_some(),
                    has_user = user.is_some(),
                    "Ignoring partial stored session"
                );
                Ok(None)
            }
        }
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        let user = serde_json::to_string(&session.user)?;
        self.store
            .set_entries(&[(TOKEN_KEY, session.token.as_str()), (USER_KEY, user.as_str())])
            .context("Failed to persist session")
    }

    pub fn clear(&self) -> Result<()> {
        self.store
            .remove_entries(&[TOKEN_KEY, USER_KEY])
            .context("Failed to clear session")
    }

    /// Stored token, ignoring read failures
    pub fn token(&self) -> Option<String> {
        self.store.get(TOKEN_KEY).ok().flatten()
    }
}
