//! Popup rendering and navigation for the decompiler context menu.
//!
//! The popup keeps one highlighted row per open level; level `n + 1` is the
//! submenu of the row highlighted at level `n`.

use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Borders, Clear, List, ListItem},
};

use crate::context_menu::{ContextAction, MenuItem};
use crate::theme::Theme;
use crate::utils::popup_rect_at;

#[derive(Debug, PartialEq)]
pub enum PopupResult {
    Ignored,
    Handled,
    Close,
    Trigger(ContextAction),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupState {
    pub anchor: (u16, u16),
    pub path: Vec<usize>,
}

/// Rows a user can land on: visible and not a separator. Disabled rows are
/// reachable so their tooltip can be shown.
fn selectable(items: &[MenuItem]) -> Vec<usize> {
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.is_selectable())
        .map(|(i, _)| i)
        .collect()
}

fn level_items<'a>(root: &'a [MenuItem], path: &[usize], depth: usize) -> Option<&'a [MenuItem]> {
    let mut items = root;
    for idx in path.iter().take(depth) {
        items = &items.get(*idx)?.submenu.as_ref()?.items;
    }
    Some(items)
}

impl PopupState {
    pub fn open(anchor: (u16, u16), root: &[MenuItem]) -> Self {
        Self {
            anchor,
            path: vec![selectable(root).first().copied().unwrap_or(0)],
        }
    }

    pub fn depth(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    pub fn current_items<'a>(&self, root: &'a [MenuItem]) -> Option<&'a [MenuItem]> {
        level_items(root, &self.path, self.depth())
    }

    pub fn selected_item<'a>(&self, root: &'a [MenuItem]) -> Option<&'a MenuItem> {
        self.current_items(root)?.get(*self.path.last()?)
    }

    fn step(&mut self, root: &[MenuItem], forward: bool) {
        let Some(items) = self.current_items(root) else {
            return;
        };
        let rows = selectable(items);
        if rows.is_empty() {
            return;
        }
        let Some(current) = self.path.last_mut() else {
            return;
        };
        let pos = rows.iter().position(|i| i == current).unwrap_or(0);
        let next = if forward {
            (pos + 1) % rows.len()
        } else if pos == 0 {
            rows.len() - 1
        } else {
            pos - 1
        };
        *current = rows[next];
    }

    pub fn next(&mut self, root: &[MenuItem]) {
        self.step(root, true);
    }

    pub fn previous(&mut self, root: &[MenuItem]) {
        self.step(root, false);
    }

    /// Opens the highlighted row's submenu. Returns false for leaves and for
    /// submenus with nothing to select.
    pub fn enter(&mut self, root: &[MenuItem]) -> bool {
        let first = self
            .selected_item(root)
            .and_then(|item| item.submenu.as_ref())
            .and_then(|sub| selectable(&sub.items).first().copied());
        match first {
            Some(first) => {
                self.path.push(first);
                true
            }
            None => false,
        }
    }

    pub fn back(&mut self) -> bool {
        if self.path.len() > 1 {
            self.path.pop();
            true
        } else {
            false
        }
    }

    fn activate(&mut self, root: &[MenuItem]) -> PopupResult {
        let Some(item) = self.selected_item(root) else {
            return PopupResult::Handled;
        };
        if item.submenu.is_some() {
            self.enter(root);
            return PopupResult::Handled;
        }
        if item.disabled {
            return PopupResult::Handled;
        }
        match &item.action {
            Some(action) => PopupResult::Trigger(action.clone()),
            None => PopupResult::Handled,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, root: &[MenuItem]) -> PopupResult {
        match key.code {
            KeyCode::Esc => PopupResult::Close,
            KeyCode::Down | KeyCode::Char('j') => {
                self.next(root);
                PopupResult::Handled
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.previous(root);
                PopupResult::Handled
            }
            KeyCode::Right | KeyCode::Char('l') => {
                self.enter(root);
                PopupResult::Handled
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.back();
                PopupResult::Handled
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.activate(root),
            _ => PopupResult::Ignored,
        }
    }

    pub fn handle_mouse(
        &mut self,
        mouse: MouseEvent,
        root: &[MenuItem],
        bounds: Rect,
    ) -> PopupResult {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return PopupResult::Ignored;
        }
        let levels = layout_levels(root, self, bounds);
        for (depth, (area, rows)) in levels.iter().enumerate().rev() {
            let inside = mouse.column >= area.x
                && mouse.column < area.x + area.width
                && mouse.row >= area.y
                && mouse.row < area.y + area.height;
            if !inside {
                continue;
            }
            let rel_y = mouse.row - area.y;
            if rel_y == 0 || rel_y >= area.height - 1 {
                return PopupResult::Handled;
            }
            let Some(idx) = rows.get((rel_y - 1) as usize).copied() else {
                return PopupResult::Handled;
            };
            let is_selectable = level_items(root, &self.path, depth)
                .and_then(|items| items.get(idx))
                .is_some_and(MenuItem::is_selectable);
            if !is_selectable {
                return PopupResult::Handled;
            }
            self.path.truncate(depth + 1);
            if let Some(last) = self.path.last_mut() {
                *last = idx;
            }
            return self.activate(root);
        }
        PopupResult::Close
    }
}

struct Columns {
    name: usize,
    shortcut: usize,
}

impl Columns {
    fn measure(items: &[MenuItem], rows: &[usize]) -> Self {
        let mut name = 0;
        let mut shortcut = 0;
        for item in rows.iter().filter_map(|i| items.get(*i)) {
            name = name.max(item.name.chars().count());
            shortcut = shortcut.max(item.shortcut_label().chars().count());
        }
        Self { name, shortcut }
    }

    /// Name, gap, shortcut, submenu marker, borders.
    fn width(&self) -> u16 {
        (self.name + 2 + self.shortcut + 2 + 2).max(16) as u16
    }
}

/// Screen rect and visible item indices for every open level.
fn layout_levels(root: &[MenuItem], popup: &PopupState, bounds: Rect) -> Vec<(Rect, Vec<usize>)> {
    let mut levels = Vec::new();
    let (mut x, mut y) = popup.anchor;
    for depth in 0..popup.path.len() {
        let Some(items) = level_items(root, &popup.path, depth) else {
            break;
        };
        let rows = crate::context_menu::items::visible_indices(items);
        let columns = Columns::measure(items, &rows);
        let area = popup_rect_at(x, y, columns.width(), rows.len() as u16 + 2, bounds);
        let selected_row = rows
            .iter()
            .position(|i| *i == popup.path[depth])
            .unwrap_or(0) as u16;
        x = area.x + area.width.saturating_sub(1);
        y = area.y + selected_row;
        levels.push((area, rows));
    }
    levels
}

pub fn render_context_menu(
    f: &mut Frame,
    bounds: Rect,
    root: &[MenuItem],
    popup: &PopupState,
    theme: &Theme,
) {
    for (depth, (area, rows)) in layout_levels(root, popup, bounds).into_iter().enumerate() {
        let Some(items) = level_items(root, &popup.path, depth) else {
            break;
        };
        let area = area.intersection(f.area());
        let columns = Columns::measure(items, &rows);
        let selected = popup.path.get(depth).copied();
        let is_active_level = depth == popup.depth();

        f.render_widget(Clear, area);

        let list_items: Vec<ListItem> = rows
            .iter()
            .filter_map(|i| items.get(*i).map(|item| (*i, item)))
            .map(|(i, item)| {
                if item.is_separator {
                    let separator = "─".repeat((area.width as usize).saturating_sub(2));
                    return ListItem::new(separator).style(Style::default().fg(theme.menu_fg));
                }

                let highlighted = Some(i) == selected;
                let mut style = if highlighted {
                    Style::default()
                        .bg(theme.menu_selected_bg)
                        .fg(theme.menu_selected_fg)
                } else {
                    Style::default().bg(theme.menu_bg).fg(theme.menu_fg)
                };
                if highlighted && !is_active_level {
                    style = style.add_modifier(Modifier::DIM);
                }
                if item.disabled {
                    style = style.fg(theme.menu_disabled_fg).add_modifier(Modifier::DIM);
                }

                let marker = if item.submenu.is_some() { " ▸" } else { "  " };
                let content = format!(
                    "{:<name_w$}  {:>short_w$}{}",
                    item.name,
                    item.shortcut_label(),
                    marker,
                    name_w = columns.name,
                    short_w = columns.shortcut
                );
                ListItem::new(content).style(style)
            })
            .collect();

        let list = List::new(list_items).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.dialog_border))
                .style(Style::default().bg(theme.menu_bg).fg(theme.menu_fg)),
        );
        f.render_widget(list, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context_menu::{DecompilerContextMenu, ItemId};
    use crossterm::event::KeyModifiers;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn selected_id(popup: &PopupState, menu: &DecompilerContextMenu) -> Option<ItemId> {
        popup.selected_item(&menu.items).map(|item| item.id)
    }

    #[test]
    fn test_navigation_skips_hidden_rows_and_separators() {
        let menu = DecompilerContextMenu::new();
        let mut popup = PopupState::open((0, 0), &menu.items);
        assert_eq!(selected_id(&popup, &menu), Some(ItemId::Copy));
        popup.previous(&menu.items);
        assert_eq!(selected_id(&popup, &menu), Some(ItemId::EditAnnotation));
        popup.next(&menu.items);
        popup.next(&menu.items);
        popup.next(&menu.items);
        popup.next(&menu.items);
        // Separator after the copy entries is skipped.
        assert_eq!(selected_id(&popup, &menu), Some(ItemId::ShowIn));
    }

    #[test]
    fn test_submenu_enter_and_back() {
        let menu = DecompilerContextMenu::new();
        let mut popup = PopupState::open((0, 0), &menu.items);
        while selected_id(&popup, &menu) != Some(ItemId::BreakpointMenu) {
            popup.next(&menu.items);
        }
        assert_eq!(popup.handle_key(key(KeyCode::Right), &menu.items), PopupResult::Handled);
        assert_eq!(popup.depth(), 1);
        assert_eq!(selected_id(&popup, &menu), Some(ItemId::ToggleBreakpoint));
        assert_eq!(
            popup.handle_key(key(KeyCode::Enter), &menu.items),
            PopupResult::Trigger(ContextAction::ToggleBreakpoint)
        );
        popup.handle_key(key(KeyCode::Left), &menu.items);
        assert_eq!(popup.depth(), 0);
        assert_eq!(popup.handle_key(key(KeyCode::Esc), &menu.items), PopupResult::Close);
    }

    #[test]
    fn test_disabled_row_is_highlighted_but_not_triggered() {
        let mut menu = DecompilerContextMenu::new();
        if let Some(item) = crate::context_menu::items::find_mut(&mut menu.items, ItemId::Copy) {
            item.disabled = true;
        }
        let mut popup = PopupState::open((0, 0), &menu.items);
        assert_eq!(selected_id(&popup, &menu), Some(ItemId::Copy));
        assert_eq!(
            popup.handle_key(key(KeyCode::Enter), &menu.items),
            PopupResult::Handled
        );
    }

    #[test]
    fn test_render_context_menu_in_small_terminal() {
        let backend = TestBackend::new(20, 5);
        let mut terminal = Terminal::new(backend).unwrap();
        let menu = DecompilerContextMenu::new();
        let mut popup = PopupState::open((15, 3), &menu.items);
        while selected_id(&popup, &menu) != Some(ItemId::BreakpointMenu) {
            popup.next(&menu.items);
        }
        popup.enter(&menu.items);
        let theme = Theme::default();

        let res = terminal.draw(|f| {
            let area = f.area();
            render_context_menu(f, area, &menu.items, &popup, &theme);
        });
        assert!(res.is_ok());
    }

    #[test]
    fn test_click_outside_closes() {
        let menu = DecompilerContextMenu::new();
        let mut popup = PopupState::open((0, 0), &menu.items);
        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 79,
            row: 39,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(
            popup.handle_mouse(click, &menu.items, Rect::new(0, 0, 80, 40)),
            PopupResult::Close
        );
    }

    #[test]
    fn test_click_on_row_triggers_action() {
        let menu = DecompilerContextMenu::new();
        let mut popup = PopupState::open((0, 0), &menu.items);
        // Row 1 inside the border is "Copy".
        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 3,
            row: 1,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(
            popup.handle_mouse(click, &menu.items, Rect::new(0, 0, 80, 40)),
            PopupResult::Trigger(ContextAction::Copy)
        );
    }
}
