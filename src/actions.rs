use crate::api::{repository_url, RepositoryApi};
use crate::config::Timing;
use crate::envelope::ClientError;
use crate::lock;
use crate::modal::{CloseTrigger, ModalController, CLONE_MODAL, CREATE_MODAL};
use crate::sidebar::SidebarRefresher;
use crate::toast::Toaster;
use crate::view::View;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{info, warn};

pub const CLONE_FORM: &str = "cloneForm";
pub const CREATE_FORM: &str = "createForm";

static REPO_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._-]+$").expect("valid pattern")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("All fields are required")]
    MissingField,
    #[error("The repository name may only contain letters, numbers, dots, hyphens and underscores")]
    InvalidName,
}

pub fn validate_repo_name(name: &str) -> Result<(), ValidationError> {
    if REPO_NAME_RE.is_match(name) {
        Ok(())
    } else {
        Err(ValidationError::InvalidName)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Invalid(ValidationError),
    Refused(String),
    Unreachable,
    Succeeded,
}

struct BusyGuard<'a> {
    view: &'a dyn View,
    form: &'static str,
}

impl<'a> BusyGuard<'a> {
    fn start(view: &'a dyn View, form: &'static str, label: &str) -> Self {
        view.set_submit_busy(form, Some(label));
        Self { view, form }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.view.set_submit_busy(self.form, None);
    }
}

pub struct RepositoryActions {
    api: Arc<dyn RepositoryApi>,
    view: Arc<dyn View>,
    toaster: Arc<Toaster>,
    modals: Arc<ModalController>,
    sidebar: Arc<SidebarRefresher>,
    timing: Timing,
    follow_ups: Mutex<Vec<JoinHandle<()>>>,
}

impl RepositoryActions {
    pub fn new(
        api: Arc<dyn RepositoryApi>,
        view: Arc<dyn View>,
        toaster: Arc<Toaster>,
        modals: Arc<ModalController>,
        sidebar: Arc<SidebarRefresher>,
        timing: Timing,
    ) -> Arc<Self> {
        Arc::new(Self {
            api,
            view,
            toaster,
            modals,
            sidebar,
            timing,
            follow_ups: Mutex::new(Vec::new()),
        })
    }

    pub async fn clone_repository(&self, repo_url: &str, local_path: &str) -> Submission {
        if repo_url.is_empty() || local_path.is_empty() {
            return self.invalid(ValidationError::MissingField);
        }

        let result = {
            let _busy = BusyGuard::start(self.view.as_ref(), CLONE_FORM, "Cloning...");
            self.api.clone_repository(repo_url, local_path).await
        };

        match result {
            Ok(out) => {
                info!(url = repo_url, path = ?out.path, "repository cloned");
                self.toaster.success(&out.message);
                self.modals.close(CLONE_MODAL, CloseTrigger::Submitted);
                let sidebar = self.sidebar.clone();
                let delay = self.timing.clone_refresh_delay;
                self.follow_up(tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    sidebar.refresh().await;
                }));
                Submission::Succeeded
            }
            Err(e) => self.failed(e, "Error cloning repository"),
        }
    }

    pub async fn create_repository(&self, repo_name: &str, repo_path: &str) -> Submission {
        if repo_name.is_empty() || repo_path.is_empty() {
            return self.invalid(ValidationError::MissingField);
        }
        if let Err(e) = validate_repo_name(repo_name) {
            return self.invalid(e);
        }

        let result = {
            let _busy = BusyGuard::start(self.view.as_ref(), CREATE_FORM, "Creating...");
            self.api.create_repository(repo_name, repo_path).await
        };

        match result {
            Ok(out) => {
                info!(name = repo_name, path = %out.path, "repository created");
                self.toaster.success(&out.message);
                self.modals.close(CREATE_MODAL, CloseTrigger::Submitted);
                let view = self.view.clone();
                let target = repository_url(&out.path);
                let delay = self.timing.create_redirect_delay;
                self.follow_up(tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    view.navigate(&target);
                }));
                Submission::Succeeded
            }
            Err(e) => self.failed(e, "Error creating repository"),
        }
    }

    pub async fn submit_clone_form(&self) -> Submission {
        let (url, path) = self
            .modals
            .with_form(CLONE_MODAL, |f| {
                (f.value("repo_url").to_string(), f.value("local_path").to_string())
            })
            .unwrap_or_default();
        self.clone_repository(&url, &path).await
    }

    pub async fn submit_create_form(&self) -> Submission {
        let (name, path) = self
            .modals
            .with_form(CREATE_MODAL, |f| {
                (f.value("repo_name").to_string(), f.value("repo_path").to_string())
            })
            .unwrap_or_default();
        self.create_repository(&name, &path).await
    }

    pub async fn settle(&self) {
        let pending = std::mem::take(&mut *lock(&self.follow_ups));
        for handle in pending {
            if let Err(e) = handle.await {
                warn!(error = %e, "follow-up task failed");
            }
        }
    }

    fn follow_up(&self, handle: JoinHandle<()>) {
        let mut pending = lock(&self.follow_ups);
        pending.retain(|h| !h.is_finished());
        pending.push(handle);
    }

    fn invalid(&self, e: ValidationError) -> Submission {
        self.toaster.error(&e.to_string());
        Submission::Invalid(e)
    }

    fn failed(&self, e: ClientError, fallback: &str) -> Submission {
        if e.is_rejection() {
            let message = e.server_message().unwrap_or(fallback).to_string();
            self.toaster.error(&message);
            return Submission::Refused(message);
        }
        warn!(error = %e, "request failed");
        self.toaster.error("Connection error");
        Submission::Unreachable
    }
}
