pub const SEARCH_INPUTS: [&str; 2] = ["commitSearch", "globalSearch"];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyPress {
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
}

impl KeyPress {
    pub fn plain(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ..Self::default()
        }
    }

    pub fn ctrl(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ctrl: true,
            ..Self::default()
        }
    }

    pub fn ctrl_shift(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ctrl: true,
            shift: true,
            ..Self::default()
        }
    }

    fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    Dismiss,
    FocusSearch,
    CreateRepository,
    CloneRepository,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatch {
    pub shortcut: Shortcut,
    pub prevent_default: bool,
}

struct Binding {
    key: &'static str,
    command: bool,
    shift: Option<bool>,
    shortcut: Shortcut,
}

impl Binding {
    fn matches(&self, press: &KeyPress) -> bool {
        if self.command && !press.command() {
            return false;
        }
        if let Some(shift) = self.shift {
            if press.shift != shift {
                return false;
            }
        }
        press.key.eq_ignore_ascii_case(self.key)
    }
}

// Order matters: the shifted combo must win over plain Ctrl+K.
const BINDINGS: &[Binding] = &[
    Binding {
        key: "Escape",
        command: false,
        shift: None,
        shortcut: Shortcut::Dismiss,
    },
    Binding {
        key: "k",
        command: true,
        shift: Some(true),
        shortcut: Shortcut::CloneRepository,
    },
    Binding {
        key: "k",
        command: true,
        shift: Some(false),
        shortcut: Shortcut::FocusSearch,
    },
    Binding {
        key: "n",
        command: true,
        shift: Some(false),
        shortcut: Shortcut::CreateRepository,
    },
];

pub fn route(press: &KeyPress) -> Option<Dispatch> {
    BINDINGS.iter().find(|b| b.matches(press)).map(|b| Dispatch {
        shortcut: b.shortcut,
        prevent_default: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shortcut(press: KeyPress) -> Option<Shortcut> {
        route(&press).map(|d| d.shortcut)
    }

    #[test]
    fn routes_known_combos() {
        assert_eq!(shortcut(KeyPress::plain("Escape")), Some(Shortcut::Dismiss));
        assert_eq!(shortcut(KeyPress::ctrl("k")), Some(Shortcut::FocusSearch));
        assert_eq!(shortcut(KeyPress::ctrl("n")), Some(Shortcut::CreateRepository));
        assert_eq!(shortcut(KeyPress::ctrl_shift("K")), Some(Shortcut::CloneRepository));
    }

    #[test]
    fn meta_counts_as_command() {
        let press = KeyPress {
            key: "k".into(),
            meta: true,
            ..KeyPress::default()
        };
        assert_eq!(shortcut(press), Some(Shortcut::FocusSearch));
    }

    #[test]
    fn ignores_unbound_keys() {
        assert_eq!(shortcut(KeyPress::plain("k")), None);
        assert_eq!(shortcut(KeyPress::ctrl("x")), None);
        assert_eq!(shortcut(KeyPress::ctrl_shift("N")), None);
    }

    #[test]
    fn handled_combos_prevent_default() {
        for press in [KeyPress::plain("Escape"), KeyPress::ctrl("n")] {
            assert!(route(&press).map(|d| d.prevent_default).unwrap_or(false));
        }
    }
}
