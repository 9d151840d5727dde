use std::sync::Arc;

use crate::auth::{SessionObserver, User};

use super::{Section, ViewBinding, AUTH_STATUS, LOGIN_BUTTON, LOGOUT_BUTTON, REGISTER_BUTTON};

/// Keeps the sign-in controls in step with the session
pub struct AuthBar {
    view: Arc<dyn ViewBinding>,
}

impl AuthBar {
    pub fn new(view: Arc<dyn ViewBinding>) -> Self {
        Self { view }
    }

    fn set_signed_in(&self, signed_in: bool) {
        self.view.toggle_visibility(AUTH_STATUS, signed_in);
        self.view.toggle_visibility(LOGOUT_BUTTON, signed_in);
        self.view.toggle_visibility(LOGIN_BUTTON, !signed_in);
        self.view.toggle_visibility(REGISTER_BUTTON, !signed_in);
    }
}

pub fn welcome_text(user: &User) -> String {
    if user.is_admin() {
        format!("Hello, {}! [ADMIN]", user.username)
    } else {
        format!("Hello, {}!", user.username)
    }
}

impl SessionObserver for AuthBar {
    fn logged_in(&self, user: &User) {
        self.view.set_text(AUTH_STATUS, &welcome_text(user));
        self.set_signed_in(true);
    }

    fn logged_out(&self) {
        self.view.set_text(AUTH_STATUS, "");
        self.set_signed_in(false);
        if self.view.current_section() == Section::Profile {
            self.view.show_section(Section::Home);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::ViewState;
    use serde_json::json;

    fn user(role: Option<&str>) -> User {
        serde_json::from_value(json!({"id": 1, "username": "ana", "role": role})).unwrap()
    }

    #[test]
    fn test_logged_in_shows_welcome() {
        let view = Arc::new(ViewState::page());
        let bar = AuthBar::new(view.clone());

        bar.logged_in(&user(None));

        assert_eq!(view.text(AUTH_STATUS).as_deref(), Some("Hello, ana!"));
        assert!(view.is_visible(AUTH_STATUS));
        assert!(view.is_visible(LOGOUT_BUTTON));
        assert!(!view.is_visible(LOGIN_BUTTON));
        assert!(!view.is_visible(REGISTER_BUTTON));
    }

    #[test]
    fn test_admin_marker() {
        assert_eq!(welcome_text(&user(Some("admin"))), "Hello, ana! [ADMIN]");
        assert_eq!(welcome_text(&user(Some("moderator"))), "Hello, ana!");
    }

    #[test]
    fn test_logged_out_leaves_profile() {
        let view = Arc::new(ViewState::page());
        let bar = AuthBar::new(view.clone());
        bar.logged_in(&user(None));
        view.show_section(Section::Profile);

        bar.logged_out();

        assert_eq!(view.current_section(), Section::Home);
        assert!(view.is_visible(LOGIN_BUTTON));
        assert!(!view.is_visible(LOGOUT_BUTTON));
        assert_eq!(view.text(AUTH_STATUS).as_deref(), Some(""));
    }

    #[test]
    fn test_logged_out_keeps_other_sections() {
        let view = Arc::new(ViewState::page());
        let bar = AuthBar::new(view.clone());
        view.show_section(Section::Feed);

        bar.logged_out();
        assert_eq!(view.current_section(), Section::Feed);
    }
}
