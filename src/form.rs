use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@.]+(\.[^\s@.]+)+$").expect("valid pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldKind {
    #[default]
    Text,
    Email,
    Url,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub placeholder: Option<String>,
    pub kind: FieldKind,
    pub required: bool,
    pub value: String,
    pub error: Option<String>,
}

impl Field {
    pub fn required(name: &str, kind: FieldKind, placeholder: &str) -> Self {
        Self {
            name: name.to_string(),
            placeholder: Some(placeholder.to_string()).filter(|p| !p.is_empty()),
            kind,
            required: true,
            value: String::new(),
            error: None,
        }
    }

    pub fn optional(name: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            placeholder: None,
            kind,
            required: false,
            value: String::new(),
            error: None,
        }
    }

    pub fn constraint_valid(&self) -> bool {
        if self.value.is_empty() {
            return !self.required;
        }
        match self.kind {
            FieldKind::Text => true,
            FieldKind::Email => EMAIL_RE.is_match(&self.value),
            FieldKind::Url => Url::parse(&self.value).is_ok(),
        }
    }

    pub fn validate(&mut self) -> bool {
        if !self.required {
            self.error = None;
            return true;
        }
        let valid = self.constraint_valid() && !self.value.trim().is_empty();
        self.error = if valid { None } else { Some(self.error_message()) };
        valid
    }

    pub fn error_message(&self) -> String {
        match self.kind {
            FieldKind::Email => "Please enter a valid email address".to_string(),
            FieldKind::Url => "Please enter a valid URL".to_string(),
            FieldKind::Text => {
                let label = self
                    .placeholder
                    .as_deref()
                    .or(Some(self.name.as_str()).filter(|n| !n.is_empty()))
                    .unwrap_or("This field");
                format!("{label} is required")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    pub id: String,
    pub fields: Vec<Field>,
}

impl Form {
    pub fn new(id: &str, fields: Vec<Field>) -> Self {
        Self {
            id: id.to_string(),
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    pub fn value(&self, name: &str) -> &str {
        self.field(name).map(|f| f.value.as_str()).unwrap_or("")
    }

    pub fn first_field(&self) -> Option<&Field> {
        self.fields.first()
    }

    /// Applies typed input. Any pending error on the field is dropped without
    /// re-validating. Returns true if an error was cleared.
    pub fn input(&mut self, name: &str, value: &str) -> bool {
        match self.field_mut(name) {
            Some(field) => {
                field.value = value.to_string();
                field.error.take().is_some()
            }
            None => false,
        }
    }

    pub fn blur(&mut self, name: &str) -> bool {
        self.field_mut(name).map(Field::validate).unwrap_or(true)
    }

    pub fn reset(&mut self) {
        for f in &mut self.fields {
            f.value.clear();
            f.error = None;
        }
    }

    pub fn is_pristine(&self) -> bool {
        self.fields
            .iter()
            .all(|f| f.value.is_empty() && f.error.is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clone_form() -> Form {
        Form::new(
            "cloneForm",
            vec![
                Field::required("repo_url", FieldKind::Url, "Repository URL"),
                Field::required("local_path", FieldKind::Text, "Local path"),
                Field::optional("notes", FieldKind::Text),
            ],
        )
    }

    #[test]
    fn blank_required_text_field_uses_placeholder() {
        let mut form = clone_form();
        form.input("local_path", "   ");
        assert!(!form.blur("local_path"));
        assert_eq!(
            form.field("local_path").and_then(|f| f.error.as_deref()),
            Some("Local path is required")
        );
    }

    #[test]
    fn label_falls_back_to_name_then_generic() {
        let mut f = Field::required("repo_name", FieldKind::Text, "");
        assert!(!f.validate());
        assert_eq!(f.error.as_deref(), Some("repo_name is required"));

        let mut f = Field::required("", FieldKind::Text, "");
        f.validate();
        assert_eq!(f.error.as_deref(), Some("This field is required"));
    }

    #[test]
    fn url_and_email_get_specific_messages() {
        let mut form = clone_form();
        form.input("repo_url", "not a url");
        assert!(!form.blur("repo_url"));
        assert_eq!(
            form.field("repo_url").and_then(|f| f.error.as_deref()),
            Some("Please enter a valid URL")
        );

        form.input("repo_url", "https://example.com/team/project.git");
        assert!(form.blur("repo_url"));

        let mut email = Field::required("email", FieldKind::Email, "Email");
        email.value = "dev@example".to_string();
        assert!(!email.validate());
        assert_eq!(email.error.as_deref(), Some("Please enter a valid email address"));
        email.value = "dev@example.com".to_string();
        assert!(email.validate());
    }

    #[test]
    fn input_clears_error_without_revalidating() {
        let mut form = clone_form();
        form.blur("local_path");
        assert!(form.input("local_path", " "));
        assert_eq!(form.field("local_path").and_then(|f| f.error.clone()), None);
        assert!(!form.input("local_path", "  "));
    }

    #[test]
    fn revalidation_keeps_a_single_message() {
        let mut form = clone_form();
        form.blur("local_path");
        form.blur("local_path");
        let field = form.field("local_path").expect("field");
        assert_eq!(field.error.as_deref(), Some("Local path is required"));
    }

    #[test]
    fn optional_fields_are_not_flagged() {
        let mut form = clone_form();
        assert!(form.blur("notes"));
        assert!(form.blur("missing"));
    }

    #[test]
    fn reset_returns_form_to_pristine() {
        let mut form = clone_form();
        form.input("repo_url", "https://example.com/x.git");
        form.blur("local_path");
        assert!(!form.is_pristine());
        form.reset();
        assert!(form.is_pristine());
    }
}
