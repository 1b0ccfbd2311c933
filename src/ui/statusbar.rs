use crate::state::AppState;
use crate::ui::widget::{Widget, WidgetResult};
use crate::ui_state::UIState;
use crossterm::event::KeyEvent;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::Span,
    widgets::Paragraph,
};

#[derive(Debug, Clone)]
pub struct StatusBarState {
    pub message: String,
}

impl Default for StatusBarState {
    fn default() -> Self {
        Self {
            message: "Ready".to_string(),
        }
    }
}

impl StatusBarState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_message<S: Into<String>>(&mut self, message: S) {
        self.message = message.into();
    }
}

/// Tooltip of the highlighted popup row, when the menu shows tooltips and
/// that row is disabled.
fn active_tooltip(ui_state: &UIState) -> Option<String> {
    if !ui_state.context_menu.tooltips_visible() {
        return None;
    }
    let popup = ui_state.popup.as_ref()?;
    let item = popup.selected_item(&ui_state.context_menu.items)?;
    if item.disabled {
        item.tooltip.clone()
    } else {
        None
    }
}

pub struct StatusBar;

impl Widget for StatusBar {
    fn render(&self, f: &mut Frame, area: Rect, app_state: &AppState, ui_state: &mut UIState) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(60), // Message
                Constraint::Percentage(40), // Info
            ])
            .split(area);

        let (status_text, status_fg) = match active_tooltip(ui_state) {
            Some(tooltip) => (format!(" {}", tooltip), ui_state.theme.highlight_fg),
            None => (
                format!(" {}", ui_state.status_bar.message),
                ui_state.theme.status_bar_fg,
            ),
        };

        let status_msg = Paragraph::new(Span::styled(
            status_text,
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .style(
            Style::default()
                .bg(ui_state.theme.status_bar_bg)
                .fg(status_fg),
        );
        f.render_widget(status_msg, chunks[0]);

        let core = app_state.core.as_ref();
        let function = ui_state
            .decompiler
            .function
            .and_then(|addr| core.function_at(addr))
            .map(|func| func.name)
            .unwrap_or_else(|| "-".to_string());
        let info = format!(
            "{} | {} | Cursor: {} | {} ",
            app_state.session_name(),
            function,
            core.address_string(ui_state.context_menu.state().offset),
            if core.is_debugging() {
                "Debugging"
            } else {
                "Static"
            }
        );

        let info_widget = Paragraph::new(info).alignment(Alignment::Right).style(
            Style::default()
                .bg(ui_state.theme.status_bar_bg)
                .fg(ui_state.theme.status_bar_fg),
        );
        f.render_widget(info_widget, chunks[1]);
    }

    fn handle_input(
        &mut self,
        _key: KeyEvent,
        _app_state: &mut AppState,
        _ui_state: &mut UIState,
    ) -> WidgetResult {
        WidgetResult::Ignored
    }
}
