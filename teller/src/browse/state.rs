//! UI state for the tree browser.
//!
//! Child rows emit intents ("select me", "open my menu"); this controller is
//! the single owner of selection, expansion, and the context menu. It holds
//! no business logic and performs no I/O.

use std::collections::HashSet;

/// Ephemeral tree-browser state. Never persisted.
#[derive(Debug, Clone, Default)]
pub struct TreeUiState {
    expanded: HashSet<String>,
    selected: Option<String>,
    /// Id of the node whose context menu is open. A single shared slot:
    /// two menus can never be open at once, by construction.
    open_menu: Option<String>,
}

impl TreeUiState {
    /// Fresh state for a tree rooted at `root_id`. The root starts expanded,
    /// everything else collapsed.
    pub fn new(root_id: &str) -> Self {
        let mut expanded = HashSet::new();
        expanded.insert(root_id.to_string());
        Self {
            expanded,
            selected: None,
            open_menu: None,
        }
    }

    // --- Expansion ---

    pub fn is_expanded(&self, id: &str) -> bool {
        self.expanded.contains(id)
    }

    pub fn toggle_expanded(&mut self, id: &str) {
        if !self.expanded.remove(id) {
            self.expanded.insert(id.to_string());
        }
    }

    pub fn expanded_set(&self) -> &HashSet<String> {
        &self.expanded
    }

    // --- Selection ---

    /// Activating a node always selects it; expansion only toggles when the
    /// node has children. Selection and expansion stay decoupled.
    pub fn activate(&mut self, id: &str, has_children: bool) {
        self.selected = Some(id.to_string());
        if has_children {
            self.toggle_expanded(id);
        }
    }

    pub fn select(&mut self, id: &str) {
        self.selected = Some(id.to_string());
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    // --- Context menu (single-flight) ---

    /// Open `id`'s menu, closing any other. Last writer wins; there is no
    /// intermediate closed state. Opening a menu also selects its node so a
    /// chosen action applies to the node the menu belongs to.
    pub fn open_menu(&mut self, id: &str) {
        self.selected = Some(id.to_string());
        self.open_menu = Some(id.to_string());
    }

    pub fn close_menu(&mut self) {
        self.open_menu = None;
    }

    pub fn is_menu_open(&self, id: &str) -> bool {
        self.open_menu.as_deref() == Some(id)
    }

    pub fn menu_owner(&self) -> Option<&str> {
        self.open_menu.as_deref()
    }
}

/// Intents a context menu can emit. The owning view maps these to modal
/// forms; choosing one never performs the action directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Update,
    Transfer,
    AddChild,
    Delete,
}

impl MenuAction {
    pub const ALL: [MenuAction; 4] = [
        MenuAction::Update,
        MenuAction::Transfer,
        MenuAction::AddChild,
        MenuAction::Delete,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MenuAction::Update => "Edit user",
            MenuAction::Transfer => "Deposit / withdraw",
            MenuAction::AddChild => "Add sub-account",
            MenuAction::Delete => "Delete user",
        }
    }
}
