//! Keyboard shortcut resolution and documentation.

use crate::input::Modifiers;

/// Editor actions reachable from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShortcutAction {
    Delete,
    Undo,
    Redo,
    Duplicate,
}

/// A key press as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyChord {
    /// Key name as reported by the platform, e.g. `"z"`, `"Z"` or `"Delete"`.
    pub key: String,
    pub modifiers: Modifiers,
    /// Whether focus is inside a text input; shortcuts are suppressed then.
    pub in_text_control: bool,
}

impl KeyChord {
    pub fn new(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
            in_text_control: false,
        }
    }

    pub fn in_text_control(mut self) -> Self {
        self.in_text_control = true;
        self
    }

    /// Map the chord to an action, if any.
    pub fn resolve(&self) -> Option<ShortcutAction> {
        if self.in_text_control {
            return None;
        }
        let key = self.key.to_ascii_lowercase();
        if key == "delete" {
            return Some(ShortcutAction::Delete);
        }
        if !self.modifiers.command() {
            return None;
        }
        match key.as_str() {
            "z" if self.modifiers.shift => Some(ShortcutAction::Redo),
            "z" => Some(ShortcutAction::Undo),
            "y" => Some(ShortcutAction::Redo),
            "d" => Some(ShortcutAction::Duplicate),
            _ => None,
        }
    }
}

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub command: bool,
    pub shift: bool,
    pub action: ShortcutAction,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(
        key: &'static str,
        command: bool,
        shift: bool,
        action: ShortcutAction,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            command,
            shift,
            action,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl/Cmd+Z").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.command {
            parts.push("Ctrl/Cmd");
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key);
        parts.join("+")
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new("Delete", false, false, ShortcutAction::Delete, "Delete selected elements"),
            Shortcut::new("Z", true, false, ShortcutAction::Undo, "Undo"),
            Shortcut::new("Y", true, false, ShortcutAction::Redo, "Redo"),
            Shortcut::new("Z", true, true, ShortcutAction::Redo, "Redo"),
            Shortcut::new("D", true, false, ShortcutAction::Duplicate, "Duplicate selected elements"),
        ]
    }

    /// Shortcut list formatted one per line.
    pub fn help_text() -> String {
        Self::all()
            .iter()
            .map(|s| format!("  {:20} {}", s.format(), s.description))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
