//! Named overlay panels.
//!
//! Opening a modal attaches a backdrop click listener scoped to that modal;
//! closing it removes exactly that listener. There is no modal stack: callers
//! close one modal before opening another, or use `switch`, which closes the
//! first immediately and opens the second after `SWITCH_DELAY`.
//!
//! `open` on a modal that is already open does nothing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::view::{ClickHandler, ClickTarget, ListenerId, ViewBinding};

/// Handoff between the two overlays of a `switch`
pub const SWITCH_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModalId(&'static str);

impl ModalId {
    pub const LOGIN: ModalId = ModalId("loginModal");
    pub const REGISTER: ModalId = ModalId("registerModal");

    pub const fn new(id: &'static str) -> Self {
        Self(id)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModalState {
    #[default]
    Closed,
    Open,
}

#[derive(Default)]
struct Entry {
    state: ModalState,
    listener: Option<ListenerId>,
    pending_open: Option<JoinHandle<()>>,
}

struct Inner {
    view: Arc<dyn ViewBinding>,
    modals: Mutex<HashMap<ModalId, Entry>>,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, HashMap<ModalId, Entry>> {
        self.modals.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn open(self: &Arc<Self>, id: ModalId, entry: &mut Entry) {
        if entry.state == ModalState::Open {
            debug!(modal = id.as_str(), "Modal already open");
            return;
        }

        entry.state = ModalState::Open;
        self.view.toggle_visibility(id.as_str(), true);

        let weak = Arc::downgrade(self);
        let handler: ClickHandler = Arc::new(move |target| {
            if target != ClickTarget::Backdrop {
                return;
            }
            if let Some(inner) = weak.upgrade() {
                debug!(modal = id.as_str(), "Dismissed by outside click");
                inner.close(id);
            }
        });
        entry.listener = Some(self.view.add_click_listener(id.as_str(), handler));
        debug!(modal = id.as_str(), "Modal opened");
    }

    fn close(&self, id: ModalId) {
        let mut modals = self.lock();
        let entry = modals.entry(id).or_default();

        if let Some(pending) = entry.pending_open.take() {
            pending.abort();
        }
        if let Some(listener) = entry.listener.take() {
            self.view.remove_listener(listener);
        }
        if entry.state == ModalState::Open {
            entry.state = ModalState::Closed;
            debug!(modal = id.as_str(), "Modal closed");
        }
        if self.view.find_element(id.as_str()) {
            self.view.toggle_visibility(id.as_str(), false);
        }
    }

    /// Timer side of `switch`: the pending handle is ours, so drop it
    /// rather than abort it.
    fn finish_switch(self: &Arc<Self>, id: ModalId) {
        let mut modals = self.lock();
        let entry = modals.entry(id).or_default();
        if entry.pending_open.take().is_some() {
            self.open(id, entry);
        }
    }
}

/// Cheap to clone; clones share modal state.
#[derive(Clone)]
pub struct ModalController {
    inner: Arc<Inner>,
}

impl ModalController {
    pub fn new(view: Arc<dyn ViewBinding>) -> Self {
        Self {
            inner: Arc::new(Inner {
                view,
                modals: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Open `id` now. Supersedes a pending `switch` into the same modal.
    pub fn open(&self, id: ModalId) {
        if !self.inner.view.find_element(id.as_str()) {
            warn!(modal = id.as_str(), "Modal element not found");
            return;
        }

        let mut modals = self.inner.lock();
        let entry = modals.entry(id).or_default();
        if let Some(pending) = entry.pending_open.take() {
            pending.abort();
        }
        self.inner.open(id, entry);
    }

    /// Close `id`, cancelling a pending `switch` into it.
    pub fn close(&self, id: ModalId) {
        self.inner.close(id);
    }

    /// Close `from` now and open `to` after the switch delay.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn switch(&self, from: ModalId, to: ModalId) {
        self.close(from);

        if !self.inner.view.find_element(to.as_str()) {
            warn!(modal = to.as_str(), "Modal element not found");
            return;
        }

        let weak = Arc::downgrade(&self.inner);
        let mut modals = self.inner.lock();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(SWITCH_DELAY).await;
            if let Some(inner) = weak.upgrade() {
                inner.finish_switch(to);
            }
        });
        if let Some(previous) = modals.entry(to).or_default().pending_open.replace(timer) {
            previous.abort();
        }
        debug!(from = from.as_str(), to = to.as_str(), "Modal switch scheduled");
    }

    pub fn state(&self, id: ModalId) -> ModalState {
        self.inner
            .lock()
            .get(&id)
            .map(|entry| entry.state)
            .unwrap_or_default()
    }

    pub fn is_open(&self, id: ModalId) -> bool {
        self.state(id) == ModalState::Open
    }

    /// Target of a `switch` still waiting out its delay
    pub fn pending_modal(&self) -> Option<ModalId> {
        self.inner
            .lock()
            .iter()
            .find(|(_, entry)| entry.pending_open.is_some())
            .map(|(id, _)| *id)
    }

    pub fn open_modals(&self) -> Vec<ModalId> {
        let mut open: Vec<ModalId> = self
            .inner
            .lock()
            .iter()
            .filter(|(_, entry)| entry.state == ModalState::Open)
            .map(|(id, _)| *id)
            .collect();
        open.sort();
        open
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::ViewState;

    fn setup() -> (Arc<ViewState>, ModalController) {
        let view = Arc::new(ViewState::page());
        let modals = ModalController::new(view.clone());
        (view, modals)
    }

    #[test]
    fn test_open_and_close() {
        let (view, modals) = setup();

        modals.open(ModalId::LOGIN);
        assert!(modals.is_open(ModalId::LOGIN));
        assert!(view.is_visible("loginModal"));
        assert_eq!(view.listener_count("loginModal"), 1);

        modals.close(ModalId::LOGIN);
        assert_eq!(modals.state(ModalId::LOGIN), ModalState::Closed);
        assert!(!view.is_visible("loginModal"));
        assert_eq!(view.listener_count("loginModal"), 0);
    }

    #[test]
    fn test_open_is_idempotent() {
        let (view, modals) = setup();
        modals.open(ModalId::LOGIN);
        modals.open(ModalId::LOGIN);
        assert_eq!(view.listener_count("loginModal"), 1);
        assert_eq!(modals.open_modals(), vec![ModalId::LOGIN]);
    }

    #[test]
    fn test_unknown_modal_is_ignored() {
        let (view, modals) = setup();
        let missing = ModalId::new("addActionModal");
        modals.open(missing);
        assert!(!modals.is_open(missing));
        assert!(!view.is_visible("addActionModal"));
    }

    #[test]
    fn test_backdrop_click_dismisses_only_that_modal() {
        let (view, modals) = setup();
        modals.open(ModalId::LOGIN);
        modals.open(ModalId::REGISTER);

        view.click("loginModal", ClickTarget::Content);
        assert!(modals.is_open(ModalId::LOGIN));

        view.click("loginModal", ClickTarget::Backdrop);
        assert!(!modals.is_open(ModalId::LOGIN));
        assert!(modals.is_open(ModalId::REGISTER));
        assert_eq!(view.listener_count("loginModal"), 0);
        assert_eq!(view.listener_count("registerModal"), 1);
    }

    #[test]
    fn test_reopen_after_dismissal_attaches_fresh_listener() {
        let (view, modals) = setup();
        modals.open(ModalId::LOGIN);
        view.click("loginModal", ClickTarget::Backdrop);
        modals.open(ModalId::LOGIN);

        assert_eq!(view.listener_count("loginModal"), 1);
        view.click("loginModal", ClickTarget::Backdrop);
        assert!(!modals.is_open(ModalId::LOGIN));
    }

    #[tokio::test(start_paused = true)]
    async fn test_switch_hands_off_after_delay() {
        let (view, modals) = setup();
        modals.open(ModalId::LOGIN);

        modals.switch(ModalId::LOGIN, ModalId::REGISTER);
        assert!(!modals.is_open(ModalId::LOGIN));
        assert!(!view.is_visible("loginModal"));
        assert!(!modals.is_open(ModalId::REGISTER));

        tokio::time::sleep(Duration::from_millis(99)).await;
        assert!(!modals.is_open(ModalId::REGISTER));
        assert!(modals.open_modals().is_empty());
        assert_eq!(modals.pending_modal(), Some(ModalId::REGISTER));

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(modals.is_open(ModalId::REGISTER));
        assert!(view.is_visible("registerModal"));
        assert!(!modals.is_open(ModalId::LOGIN));
        assert_eq!(modals.open_modals(), vec![ModalId::REGISTER]);
        assert_eq!(modals.pending_modal(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_cancels_pending_switch() {
        let (_view, modals) = setup();
        modals.open(ModalId::LOGIN);
        modals.switch(ModalId::LOGIN, ModalId::REGISTER);
        modals.close(ModalId::REGISTER);
        assert_eq!(modals.pending_modal(), None);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(modals.open_modals().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_switch_back_and_forth() {
        let (_view, modals) = setup();
        modals.open(ModalId::LOGIN);
        modals.switch(ModalId::LOGIN, ModalId::REGISTER);
        tokio::time::sleep(Duration::from_millis(150)).await;
        modals.switch(ModalId::REGISTER, ModalId::LOGIN);
        assert!(modals.open_modals().is_empty());

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(modals.open_modals(), vec![ModalId::LOGIN]);
    }
}
