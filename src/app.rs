use crate::actions::{RepositoryActions, Submission, CLONE_FORM, CREATE_FORM};
use crate::api::RepositoryApi;
use crate::clipboard::Copier;
use crate::config::Timing;
use crate::form::{Field, FieldKind, Form};
use crate::format::Debouncer;
use crate::lock;
use crate::modal::{CloseTrigger, ModalController, CLONE_MODAL, CREATE_MODAL};
use crate::repo_page::RepositoryPage;
use crate::shortcuts::{self, KeyPress, Shortcut, SEARCH_INPUTS};
use crate::sidebar::SidebarRefresher;
use crate::toast::Toaster;
use crate::view::View;
use std::sync::{Arc, Mutex};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Key(KeyPress),
    OpenClone,
    OpenCreate,
    CloseModal { modal: String, trigger: CloseTrigger },
    FieldInput { modal: String, field: String, value: String },
    FieldBlur { modal: String, field: String },
    SubmitClone,
    SubmitCreate,
    RefreshSidebar,
    SearchInput(String),
    Copy(String),
    BrowsePath,
    BranchSelector,
    TabClicked(String),
    CloseToast,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handled {
    Ignored,
    Done { prevent_default: bool },
    Submitted(Submission),
}

impl Handled {
    fn done() -> Self {
        Handled::Done {
            prevent_default: false,
        }
    }
}

pub struct App {
    view: Arc<dyn View>,
    api: Arc<dyn RepositoryApi>,
    timing: Timing,
    pub toaster: Arc<Toaster>,
    pub modals: Arc<ModalController>,
    pub sidebar: Arc<SidebarRefresher>,
    pub actions: Arc<RepositoryActions>,
    copier: Copier,
    search: Debouncer,
    page: Mutex<Option<Arc<RepositoryPage>>>,
}

pub fn clone_form() -> Form {
    Form::new(
        CLONE_FORM,
        vec![
            Field::required("repo_url", FieldKind::Url, "Repository URL"),
            Field::required("local_path", FieldKind::Text, "Local path"),
        ],
    )
}

pub fn create_form() -> Form {
    Form::new(
        CREATE_FORM,
        vec![
            Field::required("repo_name", FieldKind::Text, "Repository name"),
            Field::required("repo_path", FieldKind::Text, "Repository path"),
        ],
    )
}

impl App {
    pub fn new(
        api: Arc<dyn RepositoryApi>,
        view: Arc<dyn View>,
        timing: Timing,
        copier: impl FnOnce(Arc<Toaster>) -> Copier,
    ) -> Self {
        let toaster = Toaster::new(view.clone(), timing.toast);
        let modals = ModalController::new(view.clone(), timing.focus_delay);
        modals.register(CLONE_MODAL, Some(clone_form()));
        modals.register(CREATE_MODAL, Some(create_form()));
        let sidebar = SidebarRefresher::new(api.clone(), view.clone(), toaster.clone(), timing.short_toast);
        let actions = RepositoryActions::new(
            api.clone(),
            view.clone(),
            toaster.clone(),
            modals.clone(),
            sidebar.clone(),
            timing,
        );
        Self {
            copier: copier(toaster.clone()),
            search: Debouncer::new(timing.search_debounce),
            view,
            api,
            timing,
            toaster,
            modals,
            sidebar,
            actions,
            page: Mutex::new(None),
        }
    }

    pub fn enter_repository(&self, path: &str, initial_tab: &str) -> Arc<RepositoryPage> {
        let mut slot = lock(&self.page);
        if let Some(page) = slot.as_ref().filter(|p| p.path() == path) {
            page.start_polling();
            return page.clone();
        }
        let page = RepositoryPage::new(
            path,
            initial_tab,
            self.api.clone(),
            self.view.clone(),
            self.toaster.clone(),
            self.timing.status_poll,
        );
        if let Some(previous) = slot.replace(page.clone()) {
            previous.stop_polling();
        }
        page.start_polling();
        page
    }

    pub fn leave_repository(&self) {
        if let Some(page) = lock(&self.page).take() {
            page.stop_polling();
        }
    }

    pub fn copy(&self, text: &str) -> bool {
        self.copier.copy(text)
    }

    pub fn repository_page(&self) -> Option<Arc<RepositoryPage>> {
        lock(&self.page).clone()
    }

    pub async fn handle(&self, event: UiEvent) -> Handled {
        debug!(?event, "ui event");
        match event {
            UiEvent::Key(press) => self.handle_key(&press),
            UiEvent::OpenClone => {
                self.modals.open(CLONE_MODAL);
                Handled::done()
            }
            UiEvent::OpenCreate => {
                self.modals.open(CREATE_MODAL);
                Handled::done()
            }
            UiEvent::CloseModal { modal, trigger } => {
                if self.modals.close(&modal, trigger) {
                    Handled::done()
                } else {
                    Handled::Ignored
                }
            }
            UiEvent::FieldInput { modal, field, value } => {
                self.modals.field_input(&modal, &field, &value);
                Handled::done()
            }
            UiEvent::FieldBlur { modal, field } => {
                self.modals.field_blurred(&modal, &field);
                Handled::done()
            }
            UiEvent::SubmitClone => Handled::Submitted(self.actions.submit_clone_form().await),
            UiEvent::SubmitCreate => Handled::Submitted(self.actions.submit_create_form().await),
            UiEvent::RefreshSidebar => {
                self.sidebar.refresh().await;
                Handled::done()
            }
            UiEvent::SearchInput(query) => {
                let sidebar = self.sidebar.clone();
                self.search.call(async move {
                    sidebar.filter(&query);
                });
                Handled::done()
            }
            UiEvent::Copy(text) => {
                self.copy(&text);
                Handled::done()
            }
            UiEvent::BrowsePath => {
                self.toaster.info("Folder browsing is under development");
                Handled::done()
            }
            UiEvent::BranchSelector => match self.repository_page() {
                Some(page) => {
                    page.show_branch_selector();
                    Handled::done()
                }
                None => Handled::Ignored,
            },
            UiEvent::TabClicked(tab) => match self.repository_page() {
                Some(page) => {
                    page.select_tab(&tab);
                    Handled::Done {
                        prevent_default: true,
                    }
                }
                None => Handled::Ignored,
            },
            UiEvent::CloseToast => {
                self.toaster.hide();
                Handled::done()
            }
        }
    }

    fn handle_key(&self, press: &KeyPress) -> Handled {
        let Some(dispatch) = shortcuts::route(press) else {
            return Handled::Ignored;
        };
        match dispatch.shortcut {
            Shortcut::Dismiss => match self.modals.open_modal() {
                Some(open) => {
                    self.modals.close(&open, CloseTrigger::Escape);
                }
                None => self.toaster.hide(),
            },
            Shortcut::FocusSearch => {
                for id in SEARCH_INPUTS {
                    if self.view.focus(id) {
                        break;
                    }
                }
            }
            Shortcut::CreateRepository => {
                self.modals.open(CREATE_MODAL);
            }
            Shortcut::CloneRepository => {
                self.modals.open(CLONE_MODAL);
            }
        }
        Handled::Done {
            prevent_default: dispatch.prevent_default,
        }
    }
}
