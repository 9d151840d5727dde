//! Authentication module for managing user sessions.
//!
//! This module provides:
//! - `Session`, `User`: the token and user record returned by the backend
//! - `SessionStore`: persistence of both under the `token` / `user` keys
//! - `SessionClient`: register, login, logout and startup restore
//!
//! The token and user record are always written and removed together.

pub mod client;
pub mod session;

pub use client::{SessionClient, SessionObserver};
pub use session::{Session, SessionStore, User, TOKEN_KEY, USER_KEY};
