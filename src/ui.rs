pub mod context_menu;
pub mod dialog_breakpoint;
pub mod dialog_comment;
pub mod dialog_input;
pub mod dialog_message;
pub mod dialog_text_edit;
pub mod dialog_variables;
pub mod dialog_xrefs;
pub mod statusbar;
pub mod view_decompiler;
pub mod view_hexdump;
pub mod widget;

use crate::state::AppState;
use crate::ui_state::UIState;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
};

use statusbar::StatusBar;
use view_decompiler::DecompilerView;
use view_hexdump::HexdumpView;
use widget::Widget;

pub fn ui(f: &mut Frame, app_state: &AppState, ui_state: &mut UIState) {
    ui_state.screen_area = f.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(chunks[0]);

    DecompilerView.render(f, panes[0], app_state, ui_state);
    HexdumpView.render(f, panes[1], app_state, ui_state);
    StatusBar.render(f, chunks[1], app_state, ui_state);

    if let Some(popup) = &ui_state.popup {
        context_menu::render_context_menu(
            f,
            f.area(),
            &ui_state.context_menu.items,
            popup,
            &ui_state.theme,
        );
    }

    // Dialogs render with a mutable UIState, so take it out for the call.
    if let Some(dialog) = ui_state.active_dialog.take() {
        dialog.render(f, f.area(), app_state, ui_state);
        ui_state.active_dialog = Some(dialog);
    }
}
