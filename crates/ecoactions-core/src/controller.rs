//! Application controller.
//!
//! `AppController` owns the session client, modal controller, notifier and
//! the view they share. Each user-level flow runs its steps in a fixed
//! order: persist the session, refresh the UI, close the modal, notify.

use std::sync::Arc;

use tracing::{info, warn};

use crate::api::{AuthBackend, AuthError};
use crate::auth::{SessionClient, User};
use crate::modal::{ModalController, ModalId};
use crate::notify::{Notifier, Severity};
use crate::storage::KeyValueStore;
use crate::view::{AuthBar, Section, ViewBinding};

const LOGIN_SUCCESS: &str = "Login successful!";
const REGISTER_SUCCESS: &str = "Registration successful!";
const LOGOUT_SUCCESS: &str = "Successfully logged out";
const SIGN_IN_REQUIRED: &str = "Please sign in to access this section";

pub struct AppController {
    session: SessionClient,
    modals: ModalController,
    notifier: Notifier,
    view: Arc<dyn ViewBinding>,
}

impl AppController {
    pub fn new(
        backend: Arc<dyn AuthBackend>,
        store: Arc<dyn KeyValueStore>,
        view: Arc<dyn ViewBinding>,
    ) -> Self {
        let observer = Arc::new(AuthBar::new(view.clone()));
        Self {
            session: SessionClient::new(backend, store, observer),
            modals: ModalController::new(view.clone()),
            notifier: Notifier::new(view.clone()),
            view,
        }
    }

    /// Startup: restore a persisted session and show the home section.
    pub fn restore(&mut self) -> Option<User> {
        self.view.show_section(Section::Home);
        let restored = self.session.restore_session().map(|s| s.user);
        info!(signed_in = restored.is_some(), "Application state restored");
        restored
    }

    pub async fn submit_login(&mut self, email: &str, password: &str) -> Result<User, AuthError> {
        match self.session.login(email, password).await {
            Ok(session) => {
                self.modals.close(ModalId::LOGIN);
                self.notifier.notify(LOGIN_SUCCESS, Severity::Success);
                Ok(session.user)
            }
            Err(e) => {
                warn!(error = %e, "Login failed");
                self.notifier.notify(e.user_message(), Severity::Error);
                Err(e)
            }
        }
    }

    pub async fn submit_register(
        &mut self,
        username: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<User, AuthError> {
        match self
            .session
            .register(username, email, password, confirm_password)
            .await
        {
            Ok(session) => {
                self.modals.close(ModalId::REGISTER);
                self.notifier.notify(REGISTER_SUCCESS, Severity::Success);
                Ok(session.user)
            }
            Err(e) => {
                warn!(error = %e, "Registration failed");
                self.notifier.notify(e.user_message(), Severity::Error);
                Err(e)
            }
        }
    }

    pub async fn logout(&mut self) {
        self.session.logout().await;
        self.notifier.notify(LOGOUT_SUCCESS, Severity::Info);
    }

    /// Switch the displayed section. Sections that need a session send
    /// signed-out users to the login modal instead.
    pub fn navigate(&self, section: Section) -> bool {
        if section.requires_session() && !self.session.is_logged_in() {
            self.notifier.notify(SIGN_IN_REQUIRED, Severity::Error);
            self.modals.open(ModalId::LOGIN);
            return false;
        }
        self.view.show_section(section);
        true
    }

    pub fn open_modal(&self, id: ModalId) {
        self.modals.open(id);
    }

    pub fn close_modal(&self, id: ModalId) {
        self.modals.close(id);
    }

    pub fn switch_modal(&self, from: ModalId, to: ModalId) {
        self.modals.switch(from, to);
    }

    pub fn notify(&self, message: impl Into<String>, severity: Severity) {
        self.notifier.notify(message, severity);
    }

    pub fn current_section(&self) -> Section {
        self.view.current_section()
    }

    pub fn session(&self) -> &SessionClient {
        &self.session
    }

    pub fn modals(&self) -> &ModalController {
        &self.modals
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }
}
