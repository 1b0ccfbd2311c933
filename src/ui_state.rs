use std::cell::Cell;
use std::rc::Rc;

use ratatui::layout::Rect;

use crate::context_menu::{DecompilerContextMenu, Submenu};
use crate::core::{Address, BreakpointListener};
use crate::theme::Theme;
use crate::ui::context_menu::PopupState;
use crate::ui::statusbar::StatusBarState;
use crate::ui::widget::Widget;
use crate::window::{self, AddressTypeHint, MainWindow, ViewKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivePane {
    Decompiler,
    Hexdump,
}

/// The application window as seen by the context menu. Requests are queued
/// and drained by the event loop after each action.
#[derive(Debug, Clone)]
pub struct WindowShell {
    pub views: Vec<ViewKind>,
    pub pending_navigation: Option<(Address, ViewKind)>,
    pub refresh_requested: bool,
    /// Set by the core's breakpoint listener; the event loop re-syncs the
    /// context menu and clears it.
    pub breakpoints_changed: Rc<Cell<bool>>,
}

impl Default for WindowShell {
    fn default() -> Self {
        Self {
            views: vec![ViewKind::Decompiler, ViewKind::Hexdump],
            pending_navigation: None,
            refresh_requested: false,
            breakpoints_changed: Rc::new(Cell::new(false)),
        }
    }
}

impl WindowShell {
    /// Listener to install on the core. Changes made while `toggling` is set
    /// are skipped; the bulk toggle re-syncs once when it returns.
    pub fn breakpoint_listener(&self, toggling: Rc<Cell<bool>>) -> BreakpointListener {
        let changed = Rc::clone(&self.breakpoints_changed);
        Box::new(move |address| {
            if toggling.get() {
                log::trace!("breakpoint change at {address:#x} during bulk toggle");
                return;
            }
            changed.set(true);
        })
    }
}

impl MainWindow for WindowShell {
    fn create_show_in_menu(&self, address: Address, hint: Option<AddressTypeHint>) -> Submenu {
        window::build_show_in_menu(&self.views, address, hint)
    }

    fn show_in(&mut self, address: Address, view: ViewKind) {
        self.pending_navigation = Some((address, view));
    }

    fn refresh_all(&mut self) {
        self.refresh_requested = true;
    }
}

#[derive(Debug, Clone, Default)]
pub struct DecompilerViewState {
    pub function: Option<Address>,
    pub cursor_line: usize,
    pub cursor_col: usize,
    pub scroll: usize,
}

#[derive(Debug, Clone, Default)]
pub struct HexdumpViewState {
    pub address: Address,
    pub cursor: Address,
}

pub struct UIState {
    pub theme: Theme,
    pub status_bar: StatusBarState,
    pub active_dialog: Option<Box<dyn Widget>>,
    pub active_dialog_area: Rect,
    pub active_pane: ActivePane,
    pub decompiler: DecompilerViewState,
    pub hexdump: HexdumpViewState,
    pub decompiler_area: Rect,
    pub hexdump_area: Rect,
    /// Whole frame, the bounds popups are clamped to.
    pub screen_area: Rect,
    pub context_menu: DecompilerContextMenu,
    pub popup: Option<PopupState>,
    pub window: WindowShell,
    pub should_quit: bool,
}

impl UIState {
    pub fn new(theme: Theme) -> Self {
        Self {
            theme,
            status_bar: StatusBarState::new(),
            active_dialog: None,
            active_dialog_area: Rect::default(),
            active_pane: ActivePane::Decompiler,
            decompiler: DecompilerViewState::default(),
            hexdump: HexdumpViewState::default(),
            decompiler_area: Rect::default(),
            hexdump_area: Rect::default(),
            screen_area: Rect::default(),
            context_menu: DecompilerContextMenu::new(),
            popup: None,
            window: WindowShell::default(),
            should_quit: false,
        }
    }

    pub fn set_status_message<S: Into<String>>(&mut self, message: S) {
        self.status_bar.set_message(message);
    }

    pub fn is_menu_open(&self) -> bool {
        self.popup.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_shell_queues_requests() {
        let mut shell = WindowShell::default();
        shell.show_in(0x404018, ViewKind::Hexdump);
        shell.refresh_all();
        assert_eq!(
            shell.pending_navigation,
            Some((0x404018, ViewKind::Hexdump))
        );
        assert!(shell.refresh_requested);
        let menu = shell.create_show_in_menu(0x404018, Some(AddressTypeHint::Data));
        assert_eq!(menu.items.len(), 1);
    }

    #[test]
    fn test_breakpoint_listener_skips_changes_while_toggling() {
        let shell = WindowShell::default();
        let toggling = Rc::new(Cell::new(true));
        let mut listener = shell.breakpoint_listener(Rc::clone(&toggling));

        listener(0x40101c);
        assert!(!shell.breakpoints_changed.get());

        toggling.set(false);
        listener(0x40101c);
        assert!(shell.breakpoints_changed.get());
    }
}
