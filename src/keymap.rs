//! Keyboard shortcut resolution.
//!
//! Maps a key press to an editor command. Shortcuts never fire while focus is
//! inside a text input, so typing into a textbox or the wall panel is safe.

#[cfg(test)]
#[path = "keymap_test.rs"]
mod keymap_test;

use crate::input::{Key, Modifiers};

/// An editor command bound to a key chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    Undo,
    Redo,
    Delete,
    Copy,
    Paste,
    /// Abandon the open draw gesture.
    Cancel,
}

/// Resolve a key press. Letter keys match case-insensitively.
#[must_use]
pub fn resolve(key: &Key, modifiers: Modifiers, text_focus: bool) -> Option<Shortcut> {
    if text_focus {
        return None;
    }
    match key.0.as_str() {
        "Delete" | "Backspace" => return Some(Shortcut::Delete),
        "Escape" => return Some(Shortcut::Cancel),
        _ => {}
    }
    if !modifiers.command() {
        return None;
    }
    match key.0.to_ascii_lowercase().as_str() {
        "z" if modifiers.shift => Some(Shortcut::Redo),
        "z" => Some(Shortcut::Undo),
        "y" => Some(Shortcut::Redo),
        "c" => Some(Shortcut::Copy),
        "v" => Some(Shortcut::Paste),
        _ => None,
    }
}
