//! View binding: the capabilities the core needs from a rendering environment.
//!
//! The session, modal and notification components never reach for global
//! element lookups. They talk to a `ViewBinding`, which a front end
//! implements (or reuses `ViewState`, the in-memory implementation that the
//! terminal client renders from).
//!
//! Listener registration is handle based: `add_click_listener` returns a
//! `ListenerId` and `remove_listener` removes exactly that listener.

pub mod auth_bar;
pub mod state;

use std::sync::Arc;

use crate::notify::Notification;

pub use auth_bar::AuthBar;
pub use state::{ViewSnapshot, ViewState};

/// Welcome text shown while signed in
pub const AUTH_STATUS: &str = "auth-status";
pub const LOGIN_BUTTON: &str = "btn-login";
pub const REGISTER_BUTTON: &str = "btn-register";
pub const LOGOUT_BUTTON: &str = "btn-logout";

/// Top-level sections of the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Section {
    #[default]
    Home,
    Map,
    Feed,
    Leaderboard,
    AirQuality,
    Profile,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::Home,
        Section::Map,
        Section::Feed,
        Section::Leaderboard,
        Section::AirQuality,
        Section::Profile,
    ];

    /// Identifier used by the web page for this section
    pub fn id(&self) -> &'static str {
        match self {
            Section::Home => "home",
            Section::Map => "map",
            Section::Feed => "feed",
            Section::Leaderboard => "leaderboard",
            Section::AirQuality => "air-quality",
            Section::Profile => "profile",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Section::Home => "Home",
            Section::Map => "Map",
            Section::Feed => "Eco Actions",
            Section::Leaderboard => "Leaderboard",
            Section::AirQuality => "Air Quality",
            Section::Profile => "Profile",
        }
    }

    /// Sections only reachable with a session
    pub fn requires_session(&self) -> bool {
        matches!(self, Section::Profile)
    }

    /// Get the next section (wrapping around)
    pub fn next(&self) -> Self {
        match self {
            Section::Home => Section::Map,
            Section::Map => Section::Feed,
            Section::Feed => Section::Leaderboard,
            Section::Leaderboard => Section::AirQuality,
            Section::AirQuality => Section::Profile,
            Section::Profile => Section::Home,
        }
    }

    /// Get the previous section (wrapping around)
    pub fn prev(&self) -> Self {
        match self {
            Section::Home => Section::Profile,
            Section::Map => Section::Home,
            Section::Feed => Section::Map,
            Section::Leaderboard => Section::Feed,
            Section::AirQuality => Section::Leaderboard,
            Section::Profile => Section::AirQuality,
        }
    }
}

/// Handle to an element created through the view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementHandle(pub u64);

/// Handle to an attached click listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

/// Where inside an overlay a click landed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    /// The overlay itself, outside its content panel
    Backdrop,
    Content,
}

pub type ClickHandler = Arc<dyn Fn(ClickTarget) + Send + Sync>;

pub trait ViewBinding: Send + Sync {
    fn find_element(&self, id: &str) -> bool;

    fn set_text(&self, id: &str, text: &str);

    fn toggle_visibility(&self, id: &str, visible: bool);

    fn current_section(&self) -> Section;

    fn show_section(&self, section: Section);

    fn create_notification(&self, notification: &Notification) -> ElementHandle;

    fn remove_element(&self, handle: ElementHandle);

    fn add_click_listener(&self, id: &str, handler: ClickHandler) -> ListenerId;

    fn remove_listener(&self, listener: ListenerId);
}
