//! Scripted collaborators shared by the unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use anyhow::bail;

use crate::api::{AuthBackend, AuthError, RawResponse};
use crate::auth::{SessionObserver, User};
use crate::storage::{KeyValueStore, MemoryStore};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Call {
    pub path: String,
    pub body: Value,
    pub bearer: Option<String>,
}

#[derive(Default)]
pub(crate) struct FakeBackend {
    responses: Mutex<VecDeque<Result<RawResponse, AuthError>>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, response: Result<RawResponse, AuthError>) -> &Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl AuthBackend for FakeBackend {
    async fn post_json(
        &self,
        path: &str,
        body: &Value,
        bearer: Option<&str>,
    ) -> Result<RawResponse, AuthError> {
        self.calls.lock().unwrap().push(Call {
            path: path.to_string(),
            body: body.clone(),
            bearer: bearer.map(str::to_string),
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AuthError::ConnectionError("no scripted response".to_string())))
    }
}

/// `{token: "t1", user: {id: 1, username: "ana"}}` with the given status
pub(crate) fn ana_session_response(status: u16) -> RawResponse {
    RawResponse::json(status, &json!({"token": "t1", "user": {"id": 1, "username": "ana"}}))
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ObserverEvent {
    LoggedIn(User),
    LoggedOut,
}

#[derive(Default)]
pub(crate) struct RecordingObserver {
    events: Mutex<Vec<ObserverEvent>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<ObserverEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl SessionObserver for RecordingObserver {
    fn logged_in(&self, user: &User) {
        self.events
            .lock()
            .unwrap()
            .push(ObserverEvent::LoggedIn(user.clone()));
    }

    fn logged_out(&self) {
        self.events.lock().unwrap().push(ObserverEvent::LoggedOut);
    }
}

/// Store whose batch write lands the first entry and then fails, like a
/// disk filling up halfway through
#[derive(Default)]
pub(crate) struct PartialWriteStore {
    inner: MemoryStore,
}

impl KeyValueStore for PartialWriteStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        self.inner.get(key)
    }

    fn set_entries(&self, entries: &[(&str, &str)]) -> anyhow::Result<()> {
        if let Some(first) = entries.first() {
            self.inner.set_entries(&[*first])?;
        }
        bail!("No space left on device")
    }

    fn remove_entries(&self, keys: &[&str]) -> anyhow::Result<()> {
        self.inner.remove_entries(keys)
    }
}
