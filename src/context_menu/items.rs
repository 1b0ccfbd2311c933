use std::fmt;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::actions::ContextAction;

/// Stable identity of a slot in the menu tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemId {
    Copy,
    CopyInstructionAddress,
    CopyReferenceAddress,
    ShowIn,
    ShowTarget,
    CopySeparator,
    AddComment,
    DeleteComment,
    RenameThingHere,
    DeleteName,
    XRefs,
    EditFunctionVariables,
    BreakpointMenu,
    ToggleBreakpoint,
    AdvancedBreakpoint,
    BreakpointInLine,
    DebugMenu,
    ContinueUntil,
    SetPc,
    EditAnnotation,
    ShowInView,
    Separator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shortcut {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl Shortcut {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub const fn key(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    /// Terminals disagree on whether Shift is reported as a modifier, an
    /// upper-case char, or both. Fold everything to lower-case + SHIFT.
    fn normalize(code: KeyCode, modifiers: KeyModifiers) -> (KeyCode, KeyModifiers) {
        match code {
            KeyCode::Char(c) if c.is_ascii_uppercase() => (
                KeyCode::Char(c.to_ascii_lowercase()),
                modifiers | KeyModifiers::SHIFT,
            ),
            _ => (code, modifiers),
        }
    }

    pub fn matches(&self, key: &KeyEvent) -> bool {
        Self::normalize(self.code, self.modifiers) == Self::normalize(key.code, key.modifiers)
    }
}

impl fmt::Display for Shortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            write!(f, "Ctrl+")?;
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            write!(f, "Alt+")?;
        }
        if self.modifiers.contains(KeyModifiers::SHIFT) {
            write!(f, "Shift+")?;
        }
        match self.code {
            KeyCode::Char(c) => write!(f, "{}", c.to_ascii_uppercase()),
            KeyCode::F(n) => write!(f, "F{}", n),
            other => write!(f, "{:?}", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MenuItem {
    pub id: ItemId,
    pub name: String,
    pub shortcuts: Vec<Shortcut>,
    pub is_separator: bool,
    pub action: Option<ContextAction>,
    pub visible: bool,
    pub disabled: bool,
    pub tooltip: Option<String>,
    pub submenu: Option<Submenu>,
}

impl MenuItem {
    pub fn new(id: ItemId, name: &str, action: Option<ContextAction>) -> Self {
        Self {
            id,
            name: name.to_string(),
            shortcuts: Vec::new(),
            is_separator: false,
            action,
            visible: true,
            disabled: false,
            tooltip: None,
            submenu: None,
        }
    }

    pub fn separator(id: ItemId) -> Self {
        Self {
            is_separator: true,
            ..Self::new(id, "", None)
        }
    }

    pub fn submenu(id: ItemId, submenu: Submenu) -> Self {
        Self {
            submenu: Some(submenu),
            ..Self::new(id, "", None)
        }
        .named_after_submenu()
    }

    fn named_after_submenu(mut self) -> Self {
        if let Some(sub) = &self.submenu {
            self.name = sub.title.clone();
        }
        self
    }

    pub fn with_shortcuts(mut self, shortcuts: &[Shortcut]) -> Self {
        self.shortcuts = shortcuts.to_vec();
        self
    }

    pub fn with_tooltip(mut self, tooltip: &str) -> Self {
        self.tooltip = Some(tooltip.to_string());
        self
    }

    /// Hidden items and separators cannot be selected; disabled ones can be
    /// highlighted but not triggered.
    pub fn is_selectable(&self) -> bool {
        self.visible && !self.is_separator
    }

    pub fn shortcut_label(&self) -> String {
        self.shortcuts
            .first()
            .map(|s| s.to_string())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Submenu {
    pub title: String,
    pub items: Vec<MenuItem>,
}

impl Submenu {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            items: Vec::new(),
        }
    }

    pub fn push(&mut self, item: MenuItem) {
        self.items.push(item);
    }

    pub fn visible_indices(&self) -> Vec<usize> {
        visible_indices(&self.items)
    }
}

pub fn visible_indices(items: &[MenuItem]) -> Vec<usize> {
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.visible)
        .map(|(i, _)| i)
        .collect()
}

pub fn find(items: &[MenuItem], id: ItemId) -> Option<&MenuItem> {
    for item in items {
        if item.id == id {
            return Some(item);
        }
        if let Some(found) = item.submenu.as_ref().and_then(|sub| find(&sub.items, id)) {
            return Some(found);
        }
    }
    None
}

pub fn find_mut(items: &mut [MenuItem], id: ItemId) -> Option<&mut MenuItem> {
    for item in items.iter_mut() {
        if item.id == id {
            return Some(item);
        }
        if let Some(found) = item
            .submenu
            .as_mut()
            .and_then(|sub| find_mut(&mut sub.items, id))
        {
            return Some(found);
        }
    }
    None
}

/// Walks the tree and collects every leaf (non-separator, no submenu) that
/// carries shortcuts.
pub fn collect_leaf_shortcuts(items: &[MenuItem], out: &mut Vec<(Shortcut, ItemId)>) {
    for item in items {
        if item.is_separator {
            continue;
        }
        if let Some(sub) = &item.submenu {
            collect_leaf_shortcuts(&sub.items, out);
        } else {
            out.extend(item.shortcuts.iter().map(|s| (*s, item.id)));
        }
    }
}

/// Plain-text rendering of the visible tree, two spaces per level.
pub fn outline(items: &[MenuItem]) -> Vec<String> {
    fn walk(items: &[MenuItem], depth: usize, out: &mut Vec<String>) {
        let indent = "  ".repeat(depth);
        for item in items.iter().filter(|item| item.visible) {
            if item.is_separator {
                out.push(format!("{}---", indent));
                continue;
            }
            let mut line = format!("{}{}", indent, item.name);
            if let Some(shortcut) = item.shortcuts.first() {
                line.push_str(&format!("  [{}]", shortcut));
            }
            if item.disabled {
                line.push_str("  (disabled)");
            }
            if let Some(sub) = &item.submenu {
                line.push_str(" >");
                out.push(line);
                walk(&sub.items, depth + 1, out);
            } else {
                out.push(line);
            }
        }
    }
    let mut out = Vec::new();
    walk(items, 0, &mut out);
    out
}
