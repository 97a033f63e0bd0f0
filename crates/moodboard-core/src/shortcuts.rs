//! Keyboard shortcut registry.

use crate::input::{Key, Modifiers};

/// What a shortcut does to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShortcutAction {
    SelectAll,
    Undo,
    Redo,
    Group,
    Ungroup,
    Copy,
    Cut,
    Paste,
    Duplicate,
    Delete,
    BringToFront,
    SendToBack,
}

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: Key,
    /// Ctrl, or Cmd on macOS.
    pub command: bool,
    pub shift: bool,
    pub action: ShortcutAction,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(
        key: Key,
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

    /// Format the shortcut for display (e.g., "Ctrl+Shift+Z").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.command {
            parts.push("Ctrl".to_string());
        }
        if self.shift {
            parts.push("Shift".to_string());
        }
        parts.push(match self.key {
            Key::Char(c) => c.to_ascii_uppercase().to_string(),
            other => format!("{other:?}"),
        });
        parts.join("+")
    }

    pub fn matches(&self, key: Key, modifiers: Modifiers) -> bool {
        self.key.matches(key)
            && self.command == modifiers.command()
            && self.shift == modifiers.shift
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        use ShortcutAction::*;
        vec![
            Shortcut::new(Key::Char('a'), true, false, SelectAll, "Select all items"),
            Shortcut::new(Key::Char('z'), true, false, Undo, "Undo"),
            Shortcut::new(Key::Char('z'), true, true, Redo, "Redo"),
            Shortcut::new(Key::Char('y'), true, false, Redo, "Redo"),
            Shortcut::new(Key::Char('g'), true, false, Group, "Group selected items"),
            Shortcut::new(Key::Char('g'), true, true, Ungroup, "Ungroup selected items"),
            Shortcut::new(Key::Char('c'), true, false, Copy, "Copy items"),
            Shortcut::new(Key::Char('x'), true, false, Cut, "Cut items"),
            Shortcut::new(Key::Char('v'), true, false, Paste, "Paste items"),
            Shortcut::new(Key::Char('d'), true, false, Duplicate, "Duplicate selected items"),
            Shortcut::new(Key::Char(']'), true, false, BringToFront, "Bring to front"),
            Shortcut::new(Key::Char('['), true, false, SendToBack, "Send to back"),
            Shortcut::new(Key::Delete, false, false, Delete, "Delete selected items"),
            Shortcut::new(Key::Backspace, false, false, Delete, "Delete selected items"),
        ]
    }

    /// The action bound to `key` with exactly these modifiers.
    pub fn resolve(key: Key, modifiers: Modifiers) -> Option<ShortcutAction> {
        Self::all()
            .into_iter()
            .find(|shortcut| shortcut.matches(key, modifiers))
            .map(|shortcut| shortcut.action)
    }
}
