//! Core library for the ecoactions client.
//!
//! This crate holds everything the front ends share:
//!
//! - `api`: transport seam (`AuthBackend`) and its reqwest implementation
//! - `auth`: session model, persistence and the `SessionClient`
//! - `modal`: named overlay state with outside-click dismissal
//! - `notify`: transient, auto-dismissing status messages
//! - `view`: the `ViewBinding` capability set and its in-memory `ViewState`
//! - `controller`: the `AppController` composing the pieces above
//! - `config`, `storage`: configuration file and key/value persistence

pub mod api;
pub mod auth;
pub mod config;
pub mod controller;
pub mod modal;
pub mod notify;
pub mod storage;
pub mod view;

#[cfg(test)]
mod test_support;

pub use api::{ApiClient, AuthBackend, AuthError, RawResponse};
pub use auth::{Session, SessionClient, SessionObserver, User};
pub use config::Config;
pub use controller::AppController;
pub use modal::{ModalController, ModalId, ModalState};
pub use notify::{Notification, Notifier, Severity};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use view::{Section, ViewBinding, ViewState};
