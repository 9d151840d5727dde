//! In-memory `ViewBinding`.
//!
//! Front ends render from `ViewState::snapshot()` and feed pointer input back
//! through `ViewState::click()`.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::trace;

use crate::modal::ModalId;
use crate::notify::Notification;

use super::{
    ClickHandler, ClickTarget, ElementHandle, ListenerId, Section, ViewBinding, AUTH_STATUS,
    LOGIN_BUTTON, LOGOUT_BUTTON, REGISTER_BUTTON,
};

/// Rendering-relevant state at one instant
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewSnapshot {
    pub section: Section,
    pub visible: BTreeSet<String>,
    pub texts: BTreeMap<String, String>,
    pub notification: Option<Notification>,
}

impl ViewSnapshot {
    pub fn is_visible(&self, id: &str) -> bool {
        self.visible.contains(id)
    }

    pub fn text(&self, id: &str) -> Option<&str> {
        self.texts.get(id).map(String::as_str)
    }
}

#[derive(Default)]
struct Inner {
    elements: BTreeSet<String>,
    visible: BTreeSet<String>,
    texts: BTreeMap<String, String>,
    section: Section,
    notifications: BTreeMap<ElementHandle, Notification>,
    listeners: BTreeMap<ListenerId, (String, ClickHandler)>,
    next_id: u64,
}

impl Inner {
    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct ViewState {
    inner: Mutex<Inner>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The page of the eco-actions client: auth bar plus the sign-in and
    /// registration overlays, signed out.
    pub fn page() -> Self {
        let view = Self::new();
        for id in [
            AUTH_STATUS,
            LOGIN_BUTTON,
            REGISTER_BUTTON,
            LOGOUT_BUTTON,
            ModalId::LOGIN.as_str(),
            ModalId::REGISTER.as_str(),
        ] {
            view.register_element(id);
        }
        view.toggle_visibility(LOGIN_BUTTON, true);
        view.toggle_visibility(REGISTER_BUTTON, true);
        view
    }

    pub fn register_element(&self, id: &str) {
        self.lock().elements.insert(id.to_string());
    }

    /// Deliver a click to every listener attached to `id`.
    ///
    /// Handlers run after the view lock is released, so they may call back
    /// into the view. Returns how many handlers ran.
    pub fn click(&self, id: &str, target: ClickTarget) -> usize {
        let handlers: Vec<ClickHandler> = self
            .lock()
            .listeners
            .values()
            .filter(|(element, _)| element == id)
            .map(|(_, handler)| handler.clone())
            .collect();

        trace!(element = id, ?target, handlers = handlers.len(), "Dispatching click");
        for handler in &handlers {
            handler(target);
        }
        handlers.len()
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        let inner = self.lock();
        ViewSnapshot {
            section: inner.section,
            visible: inner.visible.clone(),
            texts: inner.texts.clone(),
            notification: inner.notifications.values().next_back().cloned(),
        }
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.lock().visible.contains(id)
    }

    pub fn text(&self, id: &str) -> Option<String> {
        self.lock().texts.get(id).cloned()
    }

    /// Every notification element currently mounted
    pub fn notifications(&self) -> Vec<Notification> {
        self.lock().notifications.values().cloned().collect()
    }

    pub fn listener_count(&self, id: &str) -> usize {
        self.lock()
            .listeners
            .values()
            .filter(|(element, _)| element == id)
            .count()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ViewBinding for ViewState {
    fn find_element(&self, id: &str) -> bool {
        self.lock().elements.contains(id)
    }

    fn set_text(&self, id: &str, text: &str) {
        self.lock().texts.insert(id.to_string(), text.to_string());
    }

    fn toggle_visibility(&self, id: &str, visible: bool) {
        let mut inner = self.lock();
        if visible {
            inner.visible.insert(id.to_string());
        } else {
            inner.visible.remove(id);
        }
    }

    fn current_section(&self) -> Section {
        self.lock().section
    }

    fn show_section(&self, section: Section) {
        self.lock().section = section;
    }

    fn create_notification(&self, notification: &Notification) -> ElementHandle {
        let mut inner = self.lock();
        let handle = ElementHandle(inner.allocate());
        inner.notifications.insert(handle, notification.clone());
        handle
    }

    fn remove_element(&self, handle: ElementHandle) {
        self.lock().notifications.remove(&handle);
    }

    fn add_click_listener(&self, id: &str, handler: ClickHandler) -> ListenerId {
        let mut inner = self.lock();
        let listener = ListenerId(inner.allocate());
        inner.listeners.insert(listener, (id.to_string(), handler));
        listener
    }

    fn remove_listener(&self, listener: ListenerId) {
        self.lock().listeners.remove(&listener);
    }
}
