use crate::sidebar::SidebarContent;
use crate::toast::ToastKind;

/// Rendering port implemented by every front end.
///
/// All methods default to no-ops so an adapter only has to implement the parts
/// of the page it actually has. A missing target is never an error.
pub trait View: Send + Sync {
    fn show_toast(&self, _message: &str, _kind: ToastKind) {}
    fn hide_toast(&self) {}

    fn set_modal_open(&self, _modal: &str, _open: bool) {}
    fn set_scroll_locked(&self, _locked: bool) {}

    /// Moves focus to `element`. Returns false if there is no such element.
    fn focus(&self, _element: &str) -> bool {
        false
    }

    fn show_field_error(&self, _form: &str, _field: &str, _message: &str) {}
    fn clear_field_error(&self, _form: &str, _field: &str) {}
    fn reset_form(&self, _form: &str) {}

    /// `Some(label)` disables the form's submit control and shows `label`
    /// with a spinner; `None` restores the original control.
    fn set_submit_busy(&self, _form: &str, _label: Option<&str>) {}

    fn set_refresh_spinning(&self, _spinning: bool) {}
    fn render_sidebar(&self, _content: &SidebarContent) {}

    fn set_repo_status(&self, _clean: bool) {}
    /// `None` hides the badge.
    fn set_changes_badge(&self, _count: Option<usize>) {}
    fn activate_tab(&self, _tab: &str) {}

    fn navigate(&self, _url: &str) {}
}
