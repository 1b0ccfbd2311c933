use crate::context_menu::{ContextAction, PromptPurpose};
use crate::state::AppState;
use crate::ui_state::UIState;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::ui::widget::{Widget, WidgetResult};

/// Single-line name prompt used by every rename.
pub struct InputDialog {
    pub title: String,
    pub label: String,
    pub input: String,
    purpose: PromptPurpose,
}

impl InputDialog {
    pub fn new(
        title: impl Into<String>,
        label: impl Into<String>,
        default: impl Into<String>,
        purpose: PromptPurpose,
    ) -> Self {
        Self {
            title: title.into(),
            label: label.into(),
            input: default.into(),
            purpose,
        }
    }
}

impl Widget for InputDialog {
    fn render(&self, f: &mut Frame, area: Rect, _app_state: &AppState, ui_state: &mut UIState) {
        let theme = &ui_state.theme;
        let title = format!(" {} ", self.title);
        let block = crate::ui::widget::create_dialog_block(&title, theme);

        let width = (self.title.chars().count().max(self.input.chars().count()) + 8).max(40) as u16;
        let area = crate::utils::centered_rect_fixed(width, 4, area);
        ui_state.active_dialog_area = area;
        f.render_widget(ratatui::widgets::Clear, area);

        let lines = vec![
            Line::from(Span::styled(
                self.label.clone(),
                Style::default().fg(theme.dialog_fg),
            )),
            Line::from(vec![
                Span::styled(
                    self.input.clone(),
                    Style::default()
                        .fg(theme.highlight_fg)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
            ]),
        ];
        f.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn handle_input(
        &mut self,
        key: KeyEvent,
        _app_state: &mut AppState,
        ui_state: &mut UIState,
    ) -> WidgetResult {
        match key.code {
            KeyCode::Esc => {
                ui_state.set_status_message("Ready");
                WidgetResult::Close
            }
            KeyCode::Enter => {
                let name = self.input.trim().to_string();
                if name.is_empty() {
                    return WidgetResult::Close;
                }
                WidgetResult::Action(ContextAction::Apply(self.purpose.clone().into_edit(name)))
            }
            KeyCode::Backspace => {
                self.input.pop();
                WidgetResult::Handled
            }
            KeyCode::Char('u') if key.modifiers == KeyModifiers::CONTROL => {
                self.input.clear();
                WidgetResult::Handled
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.input.push(c);
                WidgetResult::Handled
            }
            _ => WidgetResult::Handled,
        }
    }
}
