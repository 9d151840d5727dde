//! Transient status messages.
//!
//! At most one notification is mounted at a time. Showing a new one removes
//! the current element and cancels its removal timer; each timer only ever
//! removes the element it was scheduled for.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::view::{ElementHandle, ViewBinding};

/// How long a notification stays visible
pub const DISPLAY_DURATION: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Severity {
    #[default]
    Info,
    Success,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
}

impl Notification {
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            message: message.into(),
            severity,
        }
    }
}

struct Active {
    handle: ElementHandle,
    notification: Notification,
    timer: JoinHandle<()>,
}

struct Inner {
    view: Arc<dyn ViewBinding>,
    active: Mutex<Option<Active>>,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, Option<Active>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn expire(&self, handle: ElementHandle) {
        let mut active = self.lock();
        if active.as_ref().is_some_and(|a| a.handle == handle) {
            *active = None;
            self.view.remove_element(handle);
            debug!(element = handle.0, "Notification expired");
        }
    }
}

/// Cheap to clone; clones share the visible notification.
#[derive(Clone)]
pub struct Notifier {
    inner: Arc<Inner>,
}

impl Notifier {
    pub fn new(view: Arc<dyn ViewBinding>) -> Self {
        Self {
            inner: Arc::new(Inner {
                view,
                active: Mutex::new(None),
            }),
        }
    }

    /// Show `message`, replacing whatever is visible.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn notify(&self, message: impl Into<String>, severity: Severity) {
        let notification = Notification::new(message, severity);
        let mut active = self.inner.lock();

        if let Some(previous) = active.take() {
            previous.timer.abort();
            self.inner.view.remove_element(previous.handle);
        }

        let handle = self.inner.view.create_notification(&notification);
        let weak = Arc::downgrade(&self.inner);
        let timer = tokio::spawn(async move {
            tokio::time::sleep(DISPLAY_DURATION).await;
            if let Some(inner) = weak.upgrade() {
                inner.expire(handle);
            }
        });

        debug!(severity = severity.as_str(), element = handle.0, "Notification shown");
        *active = Some(Active {
            handle,
            notification,
            timer,
        });
    }

    pub fn current(&self) -> Option<Notification> {
        self.inner.lock().as_ref().map(|a| a.notification.clone())
    }

    /// Remove the visible notification now
    pub fn dismiss(&self) {
        if let Some(active) = self.inner.lock().take() {
            active.timer.abort();
            self.inner.view.remove_element(active.handle);
        }
    }
}
