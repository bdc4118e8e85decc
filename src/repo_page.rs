use crate::api::RepositoryApi;
use crate::envelope::RepositoryStatus;
use crate::format::decode_uri_component;
use crate::lock;
use crate::toast::Toaster;
use crate::view::View;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabLoad {
    History,
    Branches,
    Files,
}

impl TabLoad {
    pub fn for_tab(tab: &str) -> Option<Self> {
        match tab {
            "history" => Some(TabLoad::History),
            "branches" => Some(TabLoad::Branches),
            "files" => Some(TabLoad::Files),
            _ => None,
        }
    }
}

pub fn repository_path_from_location(pathname: &str) -> Option<String> {
    let (_, rest) = pathname.split_once("/repository/")?;
    if rest.is_empty() {
        return None;
    }
    decode_uri_component(rest)
}

pub struct RepositoryPage {
    path: String,
    api: Arc<dyn RepositoryApi>,
    view: Arc<dyn View>,
    toaster: Arc<Toaster>,
    poll_every: Duration,
    active_tab: Mutex<String>,
    poller: Mutex<Option<JoinHandle<()>>>,
}

impl RepositoryPage {
    pub fn new(
        path: &str,
        initial_tab: &str,
        api: Arc<dyn RepositoryApi>,
        view: Arc<dyn View>,
        toaster: Arc<Toaster>,
        poll_every: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            path: path.to_string(),
            api,
            view,
            toaster,
            poll_every,
            active_tab: Mutex::new(initial_tab.to_string()),
            poller: Mutex::new(None),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn active_tab(&self) -> String {
        lock(&self.active_tab).clone()
    }

    pub fn select_tab(&self, tab: &str) -> Option<TabLoad> {
        if tab.is_empty() {
            return None;
        }
        *lock(&self.active_tab) = tab.to_string();
        self.view.activate_tab(tab);
        let load = TabLoad::for_tab(tab)?;
        match load {
            TabLoad::History => debug!(repo = %self.path, "loading commit history"),
            TabLoad::Branches => debug!(repo = %self.path, "loading branches"),
            TabLoad::Files => debug!(repo = %self.path, "loading file tree"),
        }
        Some(load)
    }

    pub fn show_branch_selector(&self) {
        self.toaster.info("Branch selector is under development");
    }

    pub async fn refresh_status(&self) -> Option<RepositoryStatus> {
        match self.api.repository_status(&self.path).await {
            Ok(status) => {
                self.apply_status(&status);
                Some(status)
            }
            Err(e) => {
                warn!(repo = %self.path, error = %e, "loading repository status failed");
                None
            }
        }
    }

    pub fn apply_status(&self, status: &RepositoryStatus) {
        self.view.set_repo_status(status.clean);
        let total = status.total_changes();
        self.view.set_changes_badge((total > 0).then_some(total));
    }

    /// Starts the periodic status poll. The first poll happens one interval
    /// from now. Returns false if a poller is already running for this page.
    pub fn start_polling(self: &Arc<Self>) -> bool {
        let mut poller = lock(&self.poller);
        if poller.as_ref().is_some_and(|h| !h.is_finished()) {
            return false;
        }
        let weak: Weak<Self> = Arc::downgrade(self);
        let period = self.poll_every;
        *poller = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(page) = weak.upgrade() else { break };
                page.refresh_status().await;
            }
        }));
        true
    }

    pub fn stop_polling(&self) {
        if let Some(handle) = lock(&self.poller).take() {
            handle.abort();
        }
    }

    pub fn is_polling(&self) -> bool {
        lock(&self.poller)
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }
}

impl Drop for RepositoryPage {
    fn drop(&mut self) {
        self.stop_polling();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::scripted::{Reply, Request, ScriptedApi};
    use crate::toast::ToastKind;
    use crate::view::recording::{Call, RecordingView};

    fn page(replies: Vec<Reply>) -> (Arc<RecordingView>, Arc<ScriptedApi>, Arc<RepositoryPage>) {
        let view = RecordingView::new();
        let api = ScriptedApi::new(replies);
        let toaster = Toaster::new(view.clone(), Duration::from_secs(5));
        let page = RepositoryPage::new(
            "/srv/app",
            "overview",
            api.clone(),
            view.clone(),
            toaster,
            Duration::from_secs(30),
        );
        (view, api, page)
    }

    fn status(modified: &[&str], staged: &[&str], untracked: &[&str]) -> RepositoryStatus {
        let owned = |v: &[&str]| v.iter().map(|s| s.to_string()).collect();
        RepositoryStatus {
            clean: modified.is_empty() && staged.is_empty() && untracked.is_empty(),
            modified_files: owned(modified),
            staged_files: owned(staged),
            untracked_files: owned(untracked),
        }
    }

    #[test]
    fn resolves_path_from_location() {
        assert_eq!(
            repository_path_from_location("/repository/%2Fsrv%2Fmy%20app").as_deref(),
            Some("/srv/my app")
        );
        assert_eq!(repository_path_from_location("/repository/"), None);
        assert_eq!(repository_path_from_location("/settings"), None);
    }

    #[test]
    fn badge_reflects_total_changes() {
        let (view, _api, page) = page(vec![]);
        page.apply_status(&status(&["a", "b"], &["c"], &[]));
        page.apply_status(&status(&[], &[], &[]));
        assert_eq!(
            view.calls(),
            vec![
                Call::RepoStatus(false),
                Call::Badge(Some(3)),
                Call::RepoStatus(true),
                Call::Badge(None),
            ]
        );
    }

    #[test]
    fn tab_selection_is_exclusive() {
        let (view, _api, page) = page(vec![]);
        assert_eq!(page.active_tab(), "overview");
        assert_eq!(page.select_tab("history"), Some(TabLoad::History));
        assert_eq!(page.select_tab("changes"), None);
        assert_eq!(page.select_tab(""), None);
        assert_eq!(page.active_tab(), "changes");
        assert_eq!(
            view.calls(),
            vec![Call::Tab("history".into()), Call::Tab("changes".into())]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn polls_every_interval_and_only_once() {
        let (view, api, page) = page(vec![
            Reply::Status(status(&["a"], &[], &[])),
            Reply::Rejected(None),
            Reply::Status(status(&[], &[], &[])),
        ]);
        assert!(page.start_polling());
        assert!(!page.start_polling());

        tokio::time::sleep(Duration::from_secs(29)).await;
        assert!(api.requests().is_empty());
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(api.requests(), vec![Request::Status("/srv/app".into())]);
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(api.requests().len(), 3);
        assert_eq!(view.calls().last(), Some(&Call::Badge(None)));

        page.stop_polling();
        assert!(!page.is_polling());
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(api.requests().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn status_failures_do_not_toast() {
        let (view, _api, page) = page(vec![Reply::Offline]);
        assert_eq!(page.refresh_status().await, None);
        assert!(view.toasts().is_empty());

        page.show_branch_selector();
        assert_eq!(
            view.toasts(),
            vec![("Branch selector is under development".to_string(), ToastKind::Info)]
        );
    }
}
