//! Interaction layer for the minigit web UI: toasts, modals, form validation,
//! keyboard shortcuts, the repository sidebar and the repository page, plus
//! the client for the server's JSON API.

pub mod actions;
pub mod api;
pub mod app;
pub mod clipboard;
pub mod config;
pub mod envelope;
pub mod form;
pub mod format;
pub mod modal;
pub mod repo_page;
pub mod shortcuts;
pub mod sidebar;
pub mod terminal;
pub mod toast;
pub mod view;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
