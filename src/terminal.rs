use crate::sidebar::{render_html, SidebarContent, EMPTY_MESSAGE};
use crate::toast::ToastKind;
use crate::view::View;

pub struct TerminalView {
    base_url: String,
    html: bool,
}

impl TerminalView {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            html: false,
        }
    }

    pub fn with_html(mut self, html: bool) -> Self {
        self.html = html;
        self
    }
}

impl View for TerminalView {
    fn show_toast(&self, message: &str, kind: ToastKind) {
        eprintln!("[{}] {}", kind.as_str(), message);
    }

    fn show_field_error(&self, form: &str, field: &str, message: &str) {
        eprintln!("{form}.{field}: {message}");
    }

    fn set_submit_busy(&self, _form: &str, label: Option<&str>) {
        if let Some(label) = label {
            eprintln!("{label}");
        }
    }

    fn render_sidebar(&self, content: &SidebarContent) {
        if self.html {
            println!("{}", render_html(content));
            return;
        }
        match content {
            SidebarContent::Empty => println!("{EMPTY_MESSAGE}"),
            SidebarContent::Repositories(repos) => {
                for r in repos {
                    println!("{}\t{}\t{}", r.name, r.kind.label(), r.path);
                }
            }
        }
    }

    fn set_repo_status(&self, clean: bool) {
        println!("status: {}", if clean { "clean" } else { "pending changes" });
    }

    fn set_changes_badge(&self, count: Option<usize>) {
        println!("changes: {}", count.unwrap_or(0));
    }

    fn navigate(&self, url: &str) {
        println!("{}{}", self.base_url, url);
    }
}
