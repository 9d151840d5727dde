//! Session client: register, login, logout and startup restore.
//!
//! Every successful sign-in persists the token and user record before the
//! observer is told about it, so UI code reacting to `logged_in` can rely
//! on storage already being current.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::api::{AuthBackend, AuthError, RawResponse, LOGIN_PATH, LOGOUT_PATH, REGISTER_PATH};
use crate::storage::KeyValueStore;

use super::session::{Session, SessionStore, User};

/// Minimum username length accepted at registration
const MIN_USERNAME_LENGTH: usize = 3;

/// Minimum password length accepted at registration
const MIN_PASSWORD_LENGTH: usize = 6;

/// UI-refresh callbacks raised by the session client
pub trait SessionObserver: Send + Sync {
    fn logged_in(&self, user: &User);

    fn logged_out(&self);
}

#[derive(Debug, Deserialize)]
struct AuthPayload {
    token: String,
    user: User,
}

pub struct SessionClient {
    backend: Arc<dyn AuthBackend>,
    store: SessionStore,
    observer: Arc<dyn SessionObserver>,
    current: Option<Session>,
}

impl SessionClient {
    pub fn new(
        backend: Arc<dyn AuthBackend>,
        store: Arc<dyn KeyValueStore>,
        observer: Arc<dyn SessionObserver>,
    ) -> Self {
        Self {
            backend,
            store: SessionStore::new(store),
            observer,
            current: None,
        }
    }

    pub async fn register(
        &mut self,
        username: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<Session, AuthError> {
        if password != confirm_password {
            debug!("Registration rejected locally: passwords differ");
            return Err(AuthError::PasswordMismatch);
        }
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::InvalidInput(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LENGTH
            )));
        }
        if username.chars().count() < MIN_USERNAME_LENGTH {
            return Err(AuthError::InvalidInput(format!(
                "Username must be at least {} characters",
                MIN_USERNAME_LENGTH
            )));
        }

        let body = json!({
            "username": username,
            "email": email,
            "password": password,
        });
        let response = self.backend.post_json(REGISTER_PATH, &body, None).await?;
        self.establish(&response)
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<Session, AuthError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AuthError::InvalidInput(
                "Please enter email and password".to_string(),
            ));
        }

        let body = json!({
            "email": email,
            "password": password,
        });
        let response = self.backend.post_json(LOGIN_PATH, &body, None).await?;
        self.establish(&response)
    }

    /// Sign out locally, telling the backend on a best-effort basis.
    ///
    /// Never fails; calling it without a session only clears storage again.
    pub async fn logout(&mut self) {
        let token = self
            .current
            .as_ref()
            .map(|s| s.token.clone())
            .or_else(|| self.store.token());

        if let Some(token) = token {
            match self
                .backend
                .post_json(LOGOUT_PATH, &json!({}), Some(&token))
                .await
            {
                Ok(response) if response.is_success() => debug!("Server session closed"),
                Ok(response) => debug!(status = response.status, "Server refused logout"),
                Err(e) => warn!(error = %e, "Error while logging out"),
            }
        }

        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to clear stored session");
        }
        self.current = None;
        self.observer.logged_out();
        info!("Logged out");
    }

    /// Read the persisted session once at startup.
    ///
    /// Unreadable or partial data counts as no session.
    pub fn restore_session(&mut self) -> Option<Session> {
        let session = match self.store.load() {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable stored session");
                None
            }
        }?;

        debug!(user_id = session.user.id, "Restored stored session");
        self.current = Some(session.clone());
        self.observer.logged_in(&session.user);
        Some(session)
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current.as_ref().map(|s| &s.user)
    }

    pub fn token(&self) -> Option<&str> {
        self.current.as_ref().map(|s| s.token.as_str())
    }

    pub fn is_logged_in(&self) -> bool {
        self.current.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.current_user().is_some_and(User::is_admin)
    }

    fn establish(&mut self, response: &RawResponse) -> Result<Session, AuthError> {
        let session = session_from_response(response)?;

        if let Err(e) = self.store.save(&session) {
            warn!(error = %e, "Failed to save session");
            if let Err(e) = self.store.clear() {
                warn!(error = %e, "Failed to clear partially saved session");
            }
        }

        self.current = Some(session.clone());
        self.observer.logged_in(&session.user);
        info!(user_id = session.user.id, username = %session.user.username, "Signed in");
        Ok(session)
    }
}

/// Interpret an auth response: status first, then the body.
fn session_from_response(response: &RawResponse) -> Result<Session, AuthError> {
    if !response.is_success() {
        return Err(AuthError::from_response(response));
    }

    let value: Value = serde_json::from_str(&response.body)
        .map_err(|e| AuthError::ConnectionError(format!("Invalid response: {}", e)))?;

    if value.get("success").and_then(Value::as_bool) == Some(false) {
        return Err(AuthError::from_unsuccessful_payload(&value));
    }

    let payload: AuthPayload = serde_json::from_value(value)
        .map_err(|e| AuthError::ConnectionError(format!("Invalid response: {}", e)))?;

    Ok(Session {
        token: payload.token,
        user: payload.user,
    })
}
