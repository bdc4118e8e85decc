use crate::api::{repository_url, RepositoryApi};
use crate::envelope::{ClientError, RepoKind, RepositorySummary};
use crate::format::escape_html;
use crate::lock;
use crate::toast::{ToastKind, Toaster};
use crate::view::View;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

pub const EMPTY_MESSAGE: &str = "No repositories";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SidebarContent {
    Empty,
    Repositories(Vec<RepositorySummary>),
}

impl SidebarContent {
    pub fn from_list(repos: Vec<RepositorySummary>) -> Self {
        if repos.is_empty() {
            SidebarContent::Empty
        } else {
            SidebarContent::Repositories(repos)
        }
    }
}

pub fn render_html(content: &SidebarContent) -> String {
    match content {
        SidebarContent::Empty => format!(
            "<div class=\"sidebar-empty\"><p>{}</p></div>",
            escape_html(EMPTY_MESSAGE)
        ),
        SidebarContent::Repositories(repos) => repos.iter().map(render_item).collect(),
    }
}

fn render_item(repo: &RepositorySummary) -> String {
    let icon = match repo.kind {
        RepoKind::Native => "git",
        RepoKind::Foreign(_) => "github",
    };
    format!(
        concat!(
            "<a class=\"sidebar-repo-item\" href=\"{href}\">",
            "<div class=\"sidebar-repo-icon\"><i class=\"bi bi-{icon}\"></i></div>",
            "<div class=\"sidebar-repo-info\">",
            "<div class=\"sidebar-repo-name\">{name}</div>",
            "<div class=\"sidebar-repo-type\">{kind}</div>",
            "</div></a>"
        ),
        href = escape_html(&repository_url(&repo.path)),
        icon = icon,
        name = escape_html(&repo.name),
        kind = escape_html(repo.kind.label()),
    )
}

struct Spinner<'a>(&'a dyn View);

impl<'a> Spinner<'a> {
    fn start(view: &'a dyn View) -> Self {
        view.set_refresh_spinning(true);
        Self(view)
    }
}

impl Drop for Spinner<'_> {
    fn drop(&mut self) {
        self.0.set_refresh_spinning(false);
    }
}

pub struct SidebarRefresher {
    api: Arc<dyn RepositoryApi>,
    view: Arc<dyn View>,
    toaster: Arc<Toaster>,
    short_toast: Duration,
    repositories: Mutex<Vec<RepositorySummary>>,
}

impl SidebarRefresher {
    pub fn new(
        api: Arc<dyn RepositoryApi>,
        view: Arc<dyn View>,
        toaster: Arc<Toaster>,
        short_toast: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            api,
            view,
            toaster,
            short_toast,
            repositories: Mutex::new(Vec::new()),
        })
    }

    pub async fn refresh(&self) -> bool {
        let _spinner = Spinner::start(self.view.as_ref());
        match self.api.list_repositories().await {
            Ok(repos) => {
                *lock(&self.repositories) = repos.clone();
                self.view.render_sidebar(&SidebarContent::from_list(repos));
                self.toaster.show(
                    "Repositories updated",
                    ToastKind::Success,
                    Some(self.short_toast),
                );
                true
            }
            Err(ClientError::Rejected(_)) => {
                self.toaster.error("Error updating repositories");
                false
            }
            Err(e) => {
                warn!(error = %e, "repository list request failed");
                self.toaster.error("Connection error");
                false
            }
        }
    }

    pub fn repositories(&self) -> Vec<RepositorySummary> {
        lock(&self.repositories).clone()
    }

    pub fn filter(&self, query: &str) -> SidebarContent {
        let needle = query.trim().to_lowercase();
        let matching = lock(&self.repositories)
            .iter()
            .filter(|r| {
                needle.is_empty()
                    || r.name.to_lowercase().contains(&needle)
                    || r.path.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect::<Vec<_>>();
        let content = SidebarContent::from_list(matching);
        self.view.render_sidebar(&content);
        content
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::scripted::{Reply, Request, ScriptedApi};
    use crate::view::recording::{Call, RecordingView};

    fn repo(name: &str, path: &str, kind: &str) -> RepositorySummary {
        RepositorySummary {
            name: name.to_string(),
            path: path.to_string(),
            kind: RepoKind::from(kind.to_string()),
        }
    }

    fn setup(replies: Vec<Reply>) -> (Arc<RecordingView>, Arc<ScriptedApi>, Arc<SidebarRefresher>) {
        let view = RecordingView::new();
        let api = ScriptedApi::new(replies);
        let toaster = Toaster::new(view.clone(), Duration::from_secs(5));
        let sidebar = SidebarRefresher::new(api.clone(), view.clone(), toaster, Duration::from_secs(2));
        (view, api, sidebar)
    }

    #[tokio::test(start_paused = true)]
    async fn empty_list_renders_empty_state() {
        let (view, api, sidebar) = setup(vec![Reply::List(vec![])]);
        assert!(sidebar.refresh().await);
        assert_eq!(api.requests(), vec![Request::List]);
        assert_eq!(
            view.calls(),
            vec![
                Call::Spinning(true),
                Call::Sidebar(SidebarContent::Empty),
                Call::Toast("Repositories updated".into(), ToastKind::Success),
                Call::Spinning(false),
            ]
        );
        assert!(render_html(&SidebarContent::Empty).contains("No repositories"));
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_replaces_whole_list() {
        let (view, _api, sidebar) = setup(vec![
            Reply::List(vec![repo("a", "/r/a", "git"), repo("b", "/r/b", "mini-git")]),
            Reply::List(vec![repo("c", "/r/c", "git")]),
        ]);
        sidebar.refresh().await;
        sidebar.refresh().await;
        assert_eq!(sidebar.repositories(), vec![repo("c", "/r/c", "git")]);
        let last = view
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Sidebar(_)))
            .last();
        assert_eq!(
            last,
            Some(Call::Sidebar(SidebarContent::Repositories(vec![repo("c", "/r/c", "git")])))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn failures_toast_and_stop_spinner() {
        let (view, _api, sidebar) = setup(vec![Reply::Rejected(Some("boom".into())), Reply::Offline]);

        assert!(!sidebar.refresh().await);
        assert!(!sidebar.refresh().await);
        assert_eq!(
            view.toasts(),
            vec![
                ("Error updating repositories".to_string(), ToastKind::Error),
                ("Connection error".to_string(), ToastKind::Error),
            ]
        );
        assert_eq!(view.calls().last(), Some(&Call::Spinning(false)));
        assert!(!view.calls().iter().any(|c| matches!(c, Call::Sidebar(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn filter_matches_name_or_path() {
        let (_view, _api, sidebar) = setup(vec![Reply::List(vec![
            repo("website", "/srv/web", "git"),
            repo("tools", "/srv/Website-tools", "mini-git"),
            repo("notes", "/home/notes", "mini-git"),
        ])]);
        sidebar.refresh().await;

        match sidebar.filter("WEB") {
            SidebarContent::Repositories(list) => {
                let names: Vec<_> = list.iter().map(|r| r.name.as_str()).collect();
                assert_eq!(names, vec!["website", "tools"]);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(sidebar.filter("zzz"), SidebarContent::Empty);
    }

    #[test]
    fn rendering_escapes_server_strings() {
        let html = render_html(&SidebarContent::Repositories(vec![repo(
            "<script>x</script>",
            "/r/a b",
            "mini-git",
        )]));
        assert!(html.contains("&lt;script&gt;x&lt;/script&gt;"));
        assert!(html.contains("href=\"/repository/%2Fr%2Fa%20b\""));
        assert!(html.contains("bi-git"));
        assert!(!html.contains("<script>"));
    }
}
