use crate::context_menu::ContextAction;
use crate::core::Address;
use crate::edits::PendingEdit;
use crate::state::AppState;
use crate::ui_state::UIState;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    widgets::Paragraph,
};
use ratatui_textarea::TextArea;

use crate::ui::widget::{Widget, WidgetResult};

/// Free-form editor for a function's annotation blob.
pub struct TextEditDialog {
    title: String,
    function: Address,
    textarea: TextArea<'static>,
}

impl TextEditDialog {
    pub fn new(title: impl Into<String>, function: Address, text: &str) -> Self {
        Self {
            title: title.into(),
            function,
            textarea: TextArea::from(text.lines()),
        }
    }
}

impl Widget for TextEditDialog {
    fn render(&self, f: &mut Frame, area: Rect, _app_state: &AppState, ui_state: &mut UIState) {
        let theme = &ui_state.theme;
        let title = format!(" {} ", self.title);
        let block = crate::ui::widget::create_dialog_block(&title, theme);

        let area = crate::utils::centered_rect(80, 80, area);
        ui_state.active_dialog_area = area;
        f.render_widget(ratatui::widgets::Clear, area);

        let inner = block.inner(area);
        f.render_widget(block, area);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(inner);

        // The textarea keeps its own viewport on the cursor.
        let mut textarea = self.textarea.clone();
        textarea.set_style(Style::default().fg(theme.dialog_fg));
        textarea.set_cursor_style(Style::default().add_modifier(Modifier::REVERSED));
        textarea.set_cursor_line_style(Style::default());
        textarea.set_line_number_style(Style::default().fg(theme.comment));
        f.render_widget(&textarea, chunks[0]);

        f.render_widget(
            Paragraph::new("Ctrl+S save  Esc cancel").style(Style::default().fg(theme.comment)),
            chunks[1],
        );
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
            KeyCode::Char('s') if key.modifiers == KeyModifiers::CONTROL => {
                WidgetResult::Action(ContextAction::Apply(PendingEdit::SetAnnotations {
                    function: self.function,
                    text: self.textarea.lines().join("\n"),
                }))
            }
            _ => {
                self.textarea.input(key);
                WidgetResult::Handled
            }
        }
    }
}
