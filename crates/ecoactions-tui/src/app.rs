//! Application state for the terminal client.
//!
//! `App` wraps the core `AppController` with the state only a terminal needs:
//! form buffers, field focus and the help overlay. Everything the controller
//! changes is read back from the shared `ViewState` when rendering.

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, warn};

use ecoactions_core::view::{ClickTarget, ViewSnapshot};
use ecoactions_core::{
    ApiClient, AppController, AuthBackend, Config, FileStore, KeyValueStore, ModalId, Section,
    User, ViewState,
};

// ============================================================================
// Constants
// ============================================================================

/// Maximum length for username input (backend column is 80 chars).
const MAX_USERNAME_LENGTH: usize = 80;

/// Maximum length for email input (backend column is 120 chars).
const MAX_EMAIL_LENGTH: usize = 120;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

// ============================================================================
// UI State Types
// ============================================================================

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginFocus {
    #[default]
    Email,
    Password,
    Button,
}

impl LoginFocus {
    pub fn next(&self) -> Self {
        match self {
            LoginFocus::Email => LoginFocus::Password,
            LoginFocus::Password => LoginFocus::Button,
            LoginFocus::Button => LoginFocus::Email,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            LoginFocus::Email => LoginFocus::Button,
            LoginFocus::Password => LoginFocus::Email,
            LoginFocus::Button => LoginFocus::Password,
        }
    }
}

/// Registration form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegisterFocus {
    #[default]
    Username,
    Email,
    Password,
    Confirm,
    Button,
}

impl RegisterFocus {
    pub fn next(&self) -> Self {
        match self {
            RegisterFocus::Username => RegisterFocus::Email,
            RegisterFocus::Email => RegisterFocus::Password,
            RegisterFocus::Password => RegisterFocus::Confirm,
            RegisterFocus::Confirm => RegisterFocus::Button,
            RegisterFocus::Button => RegisterFocus::Username,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            RegisterFocus::Username => RegisterFocus::Button,
            RegisterFocus::Email => RegisterFocus::Username,
            RegisterFocus::Password => RegisterFocus::Email,
            RegisterFocus::Confirm => RegisterFocus::Password,
            RegisterFocus::Button => RegisterFocus::Confirm,
        }
    }
}

#[derive(Debug, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub focus: LoginFocus,
}

impl LoginForm {
    pub fn push(&mut self, c: char) {
        match self.focus {
            LoginFocus::Email => {
                if can_add_email_char(self.email.chars().count(), c) {
                    self.email.push(c);
                }
            }
            LoginFocus::Password => {
                if can_add_password_char(self.password.chars().count(), c) {
                    self.password.push(c);
                }
            }
            LoginFocus::Button => {}
        }
    }

    pub fn pop(&mut self) {
        match self.focus {
            LoginFocus::Email => {
                self.email.pop();
            }
            LoginFocus::Password => {
                self.password.pop();
            }
            LoginFocus::Button => {}
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Default)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub focus: RegisterFocus,
}

impl RegisterForm {
    pub fn push(&mut self, c: char) {
        match self.focus {
            RegisterFocus::Username => {
                if can_add_username_char(self.username.chars().count(), c) {
                    self.username.push(c);
                }
            }
            RegisterFocus::Email => {
                if can_add_email_char(self.email.chars().count(), c) {
                    self.email.push(c);
                }
            }
            RegisterFocus::Password => {
                if can_add_password_char(self.password.chars().count(), c) {
                    self.password.push(c);
                }
            }
            RegisterFocus::Confirm => {
                if can_add_password_char(self.confirm_password.chars().count(), c) {
                    self.confirm_password.push(c);
                }
            }
            RegisterFocus::Button => {}
        }
    }

    pub fn pop(&mut self) {
        match self.focus {
            RegisterFocus::Username => {
                self.username.pop();
            }
            RegisterFocus::Email => {
                self.email.pop();
            }
            RegisterFocus::Password => {
                self.password.pop();
            }
            RegisterFocus::Confirm => {
                self.confirm_password.pop();
            }
            RegisterFocus::Button => {}
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    pub controller: AppController,
    pub view: Arc<ViewState>,
    pub config: Config,
    pub state: AppState,
    pub login_form: LoginForm,
    pub register_form: RegisterForm,
}

impl App {
    /// Create the application against the configured backend and the
    /// on-disk store, restoring any saved session.
    pub fn new(config: Config) -> Result<Self> {
        let backend = Arc::new(ApiClient::from_config(&config)?);
        let store = Arc::new(FileStore::new(&Config::data_dir()?));
        debug!(api = %backend.base_url(), "Backend configured");
        Ok(Self::from_parts(config, backend, store))
    }

    pub fn from_parts(
        config: Config,
        backend: Arc<dyn AuthBackend>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        let view = Arc::new(ViewState::page());
        let mut controller = AppController::new(backend, store, view.clone());
        controller.restore();

        Self {
            controller,
            view,
            config,
            state: AppState::Normal,
            login_form: LoginForm::default(),
            register_form: RegisterForm::default(),
        }
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        self.view.snapshot()
    }

    pub fn current_user(&self) -> Option<&User> {
        self.controller.session().current_user()
    }

    pub fn is_logged_in(&self) -> bool {
        self.controller.session().is_logged_in()
    }

    /// The modal receiving input, if any
    pub fn active_modal(&self) -> Option<ModalId> {
        [ModalId::REGISTER, ModalId::LOGIN]
            .into_iter()
            .find(|id| self.controller.modals().is_open(*id))
    }

    /// True while one dialog has closed and the next has not yet opened
    pub fn is_switching_modal(&self) -> bool {
        self.controller.modals().pending_modal().is_some()
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub fn navigate(&mut self, section: Section) {
        if !self.controller.navigate(section) {
            self.prepare_login();
        }
    }

    pub fn next_section(&mut self) {
        let next = self.controller.current_section().next();
        self.navigate(next);
    }

    pub fn prev_section(&mut self) {
        let prev = self.controller.current_section().prev();
        self.navigate(prev);
    }

    // =========================================================================
    // Modals
    // =========================================================================

    pub fn open_login(&mut self) {
        self.prepare_login();
        self.controller.open_modal(ModalId::LOGIN);
    }

    pub fn open_register(&mut self) {
        self.register_form.focus = RegisterFocus::Username;
        self.controller.open_modal(ModalId::REGISTER);
    }

    pub fn switch_to_register(&mut self) {
        self.register_form.focus = RegisterFocus::Username;
        self.controller.switch_modal(ModalId::LOGIN, ModalId::REGISTER);
    }

    pub fn switch_to_login(&mut self) {
        self.prepare_login();
        self.controller.switch_modal(ModalId::REGISTER, ModalId::LOGIN);
    }

    /// Deliver a pointer click to an open modal
    pub fn click_modal(&self, id: ModalId, target: ClickTarget) {
        self.view.click(id.as_str(), target);
    }

    /// Esc behaves like a click outside the dialog
    pub fn dismiss_modal(&self, id: ModalId) {
        self.click_modal(id, ClickTarget::Backdrop);
    }

    fn prepare_login(&mut self) {
        if self.login_form.email.is_empty() {
            if let Some(ref email) = self.config.last_email {
                self.login_form.email = email.clone();
            }
        }
        self.login_form.focus = if self.login_form.email.is_empty() {
            LoginFocus::Email
        } else {
            LoginFocus::Password
        };
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Submit the login form. Returns true on success.
    pub async fn submit_login(&mut self) -> bool {
        let email = self.login_form.email.trim().to_string();
        let password = self.login_form.password.clone();

        match self.controller.submit_login(&email, &password).await {
            Ok(_) => {
                self.config.last_email = Some(email);
                if let Err(e) = self.config.save() {
                    warn!(error = %e, "Failed to save config");
                }
                self.login_form.reset();
                true
            }
            Err(_) => {
                self.login_form.password.clear();
                self.login_form.focus = LoginFocus::Password;
                false
            }
        }
    }

    /// Submit the registration form. Returns true on success.
    pub async fn submit_register(&mut self) -> bool {
        let form = &self.register_form;
        let username = form.username.trim().to_string();
        let email = form.email.trim().to_string();
        let password = form.password.clone();
        let confirm = form.confirm_password.clone();

        match self
            .controller
            .submit_register(&username, &email, &password, &confirm)
            .await
        {
            Ok(_) => {
                self.config.last_email = Some(email);
                if let Err(e) = self.config.save() {
                    warn!(error = %e, "Failed to save config");
                }
                self.register_form.reset();
                true
            }
            Err(_) => {
                self.register_form.password.clear();
                self.register_form.confirm_password.clear();
                self.register_form.focus = RegisterFocus::Password;
                false
            }
        }
    }

    pub async fn logout(&mut self) {
        self.controller.logout().await;
    }

    /// Sign out and clear stored credentials even when nothing could be
    /// restored from them. Returns whether a session was active.
    pub async fn forget_session(&mut self) -> bool {
        let was_signed_in = self.is_logged_in();
        self.controller.logout().await;
        was_signed_in
    }

    /// Message of the visible notification, if any
    pub fn notification_message(&self) -> Option<String> {
        self.controller.notifier().current().map(|n| n.message)
    }
}

// ============================================================================
// Input validation
// ============================================================================

/// Check if a character is valid for text input (printable, not control)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if a username character should be accepted
pub fn can_add_username_char(current_len: usize, c: char) -> bool {
    current_len < MAX_USERNAME_LENGTH && is_valid_input_char(c) && !c.is_whitespace()
}

/// Check if an email character should be accepted
pub fn can_add_email_char(current_len: usize, c: char) -> bool {
    current_len < MAX_EMAIL_LENGTH && is_valid_input_char(c) && !c.is_whitespace()
}

/// Check if a password character should be accepted
pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================
