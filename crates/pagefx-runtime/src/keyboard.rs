#![forbid(unsafe_code)]

//! Global keyboard shortcuts.

use pagefx_core::KeyPress;

use crate::config::KeyboardConfig;

/// A recognized shortcut.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shortcut {
    /// `Escape`: close the mobile menu.
    CloseMenu,
    /// Ctrl/Cmd + search key: show the search placeholder.
    Search,
}

impl Shortcut {
    /// Whether the host should suppress the browser's default action.
    #[must_use]
    pub fn prevents_default(self) -> bool {
        matches!(self, Self::Search)
    }
}

/// Map a key press to the shortcut it triggers.
#[must_use]
pub fn shortcut_for(key: &KeyPress, config: &KeyboardConfig) -> Option<Shortcut> {
    if key.key == "Escape" {
        return Some(Shortcut::CloseMenu);
    }
    if key.command() && key.key == config.search_key {
        return Some(Shortcut::Search);
    }
    None
}
