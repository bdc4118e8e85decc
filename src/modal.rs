use crate::form::Form;
use crate::lock;
use crate::view::View;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tracing::debug;

pub const CLONE_MODAL: &str = "cloneModal";
pub const CREATE_MODAL: &str = "createModal";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseTrigger {
    Backdrop,
    CloseButton,
    Cancel,
    Escape,
    Submitted,
}

#[derive(Debug, Clone)]
pub struct ModalState {
    pub id: String,
    pub is_open: bool,
    pub form: Option<Form>,
}

#[derive(Default)]
struct Modals {
    by_id: BTreeMap<String, ModalState>,
    scroll_locked: bool,
}

impl Modals {
    fn any_open(&self) -> bool {
        self.by_id.values().any(|m| m.is_open)
    }
}

pub struct ModalController {
    view: Arc<dyn View>,
    focus_delay: Duration,
    modals: Mutex<Modals>,
}

impl ModalController {
    pub fn new(view: Arc<dyn View>, focus_delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            view,
            focus_delay,
            modals: Mutex::new(Modals::default()),
        })
    }

    pub fn register(&self, id: &str, form: Option<Form>) {
        lock(&self.modals).by_id.insert(
            id.to_string(),
            ModalState {
                id: id.to_string(),
                is_open: false,
                form,
            },
        );
    }

    /// Opens `id` and schedules focus on its first field. Unknown ids are
    /// ignored. Needs a tokio runtime for the focus delay.
    pub fn open(self: &Arc<Self>, id: &str) -> bool {
        let first_field = {
            let mut modals = lock(&self.modals);
            let Some(modal) = modals.by_id.get_mut(id) else {
                return false;
            };
            modal.is_open = true;
            let first = modal
                .form
                .as_ref()
                .and_then(|f| f.first_field())
                .map(|f| f.name.clone());
            self.view.set_modal_open(id, true);
            self.sync_scroll_lock(&mut modals);
            first
        };

        if let Some(field) = first_field {
            let weak: Weak<Self> = Arc::downgrade(self);
            let id = id.to_string();
            let delay = self.focus_delay;
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                if let Some(ctl) = weak.upgrade() {
                    if ctl.is_open(&id) {
                        ctl.view.focus(&field);
                    }
                }
            });
        }
        true
    }

    pub fn close(&self, id: &str, trigger: CloseTrigger) -> bool {
        let mut modals = lock(&self.modals);
        let Some(modal) = modals.by_id.get_mut(id) else {
            return false;
        };
        debug!(modal = id, ?trigger, "closing modal");
        modal.is_open = false;
        let form_id = modal.form.as_mut().map(|f| {
            f.reset();
            f.id.clone()
        });
        self.view.set_modal_open(id, false);
        self.sync_scroll_lock(&mut modals);
        if let Some(form_id) = form_id {
            self.view.reset_form(&form_id);
        }
        true
    }

    pub fn is_open(&self, id: &str) -> bool {
        lock(&self.modals)
            .by_id
            .get(id)
            .map(|m| m.is_open)
            .unwrap_or(false)
    }

    pub fn open_modal(&self) -> Option<String> {
        lock(&self.modals)
            .by_id
            .values()
            .find(|m| m.is_open)
            .map(|m| m.id.clone())
    }

    pub fn is_scroll_locked(&self) -> bool {
        lock(&self.modals).scroll_locked
    }

    pub fn with_form<R>(&self, id: &str, f: impl FnOnce(&mut Form) -> R) -> Option<R> {
        let mut modals = lock(&self.modals);
        modals.by_id.get_mut(id)?.form.as_mut().map(f)
    }

    pub fn field_input(&self, id: &str, field: &str, value: &str) {
        let cleared = self.with_form(id, |form| (form.id.clone(), form.input(field, value)));
        if let Some((form_id, true)) = cleared {
            self.view.clear_field_error(&form_id, field);
        }
    }

    pub fn field_blurred(&self, id: &str, field: &str) -> bool {
        let outcome = self.with_form(id, |form| {
            let valid = form.blur(field);
            let message = form.field(field).and_then(|f| f.error.clone());
            (form.id.clone(), valid, message)
        });
        let Some((form_id, valid, message)) = outcome else {
            return true;
        };
        // Clear first so the view never holds two messages for one field.
        self.view.clear_field_error(&form_id, field);
        if let Some(message) = message {
            self.view.show_field_error(&form_id, field, &message);
        }
        valid
    }

    fn sync_scroll_lock(&self, modals: &mut Modals) {
        let locked = modals.any_open();
        if locked != modals.scroll_locked {
            modals.scroll_locked = locked;
            self.view.set_scroll_locked(locked);
        }
    }
}
