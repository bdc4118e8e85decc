use crate::lock;
use crate::view::View;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

impl ToastKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToastKind::Info => "info",
            ToastKind::Success => "success",
            ToastKind::Warning => "warning",
            ToastKind::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToastState {
    pub message: String,
    pub kind: ToastKind,
    pub expires_at: Option<Instant>,
}

#[derive(Default)]
struct Slot {
    current: Option<ToastState>,
    timer: Option<JoinHandle<()>>,
    generation: u64,
}

pub struct Toaster {
    view: Arc<dyn View>,
    default_duration: Duration,
    slot: Mutex<Slot>,
}

impl Toaster {
    pub fn new(view: Arc<dyn View>, default_duration: Duration) -> Arc<Self> {
        Arc::new(Self {
            view,
            default_duration,
            slot: Mutex::new(Slot::default()),
        })
    }

    pub fn info(self: &Arc<Self>, message: &str) {
        self.show(message, ToastKind::Info, None);
    }

    pub fn success(self: &Arc<Self>, message: &str) {
        self.show(message, ToastKind::Success, None);
    }

    pub fn error(self: &Arc<Self>, message: &str) {
        self.show(message, ToastKind::Error, None);
    }

    /// Shows `message` for `duration` (the configured default when `None`).
    ///
    /// Must be called from within a tokio runtime; the countdown is a task.
    pub fn show(self: &Arc<Self>, message: &str, kind: ToastKind, duration: Option<Duration>) {
        let duration = duration.unwrap_or(self.default_duration);
        let mut slot = lock(&self.slot);
        if let Some(timer) = slot.timer.take() {
            timer.abort();
        }
        slot.generation += 1;
        let generation = slot.generation;
        slot.current = Some(ToastState {
            message: message.to_string(),
            kind,
            expires_at: Some(Instant::now() + duration),
        });
        self.view.show_toast(message, kind);

        let weak: Weak<Self> = Arc::downgrade(self);
        slot.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            if let Some(toaster) = weak.upgrade() {
                toaster.expire(generation);
            }
        }));
    }

    pub fn hide(&self) {
        let mut slot = lock(&self.slot);
        if let Some(timer) = slot.timer.take() {
            timer.abort();
        }
        slot.current = None;
        self.view.hide_toast();
    }

    pub fn current(&self) -> Option<ToastState> {
        lock(&self.slot).current.clone()
    }

    pub fn is_visible(&self) -> bool {
        lock(&self.slot).current.is_some()
    }

    fn expire(&self, generation: u64) {
        let mut slot = lock(&self.slot);
        if slot.generation != generation || slot.current.is_none() {
            return;
        }
        slot.timer = None;
        slot.current = None;
        self.view.hide_toast();
    }
}

impl Drop for Toaster {
    fn drop(&mut self) {
        if let Some(timer) = lock(&self.slot).timer.take() {
            timer.abort();
        }
    }
}
