use crate::context_menu::ContextAction;
use crate::core::{Address, address_string};
use crate::edits::PendingEdit;
use crate::state::AppState;
use crate::ui_state::UIState;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use ratatui_textarea::{CursorMove, TextArea};

use crate::ui::widget::{Widget, WidgetResult};

/// Comment editor for the first address of the cursor line. An empty
/// comment removes the existing one.
pub struct CommentDialog {
    pub address: Address,
    pub textarea: TextArea<'static>,
    editing: bool,
}

impl CommentDialog {
    pub fn new(address: Address, current_comment: Option<&str>) -> Self {
        let textarea = match current_comment {
            Some(comment) if !comment.is_empty() => {
                let mut t = TextArea::from(comment.lines());
                t.move_cursor(CursorMove::Bottom);
                t.move_cursor(CursorMove::End);
                t
            }
            _ => TextArea::default(),
        };
        Self {
            address,
            textarea,
            editing: current_comment.is_some(),
        }
    }

    pub fn text(&self) -> String {
        self.textarea.lines().join("\n").trim().to_string()
    }
}

impl Widget for CommentDialog {
    fn render(&self, f: &mut Frame, area: Rect, _app_state: &AppState, ui_state: &mut UIState) {
        let theme = &ui_state.theme;
        let title = format!(
            " {} Comment at {} ",
            if self.editing { "Edit" } else { "Add" },
            address_string(self.address)
        );
        let block = crate::ui::widget::create_dialog_block(&title, theme);

        let area = crate::utils::centered_rect_fixed(70, 10, area);
        ui_state.active_dialog_area = area;
        f.render_widget(ratatui::widgets::Clear, area);

        let inner = block.inner(area);
        f.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(inner);

        let mut textarea = self.textarea.clone();
        textarea.set_style(Style::default().fg(theme.dialog_fg));
        textarea.set_cursor_style(Style::default().add_modifier(Modifier::REVERSED));
        textarea.set_cursor_line_style(Style::default());
        f.render_widget(&textarea, chunks[0]);

        let hint = Line::from(vec![
            Span::styled(
                "Ctrl+S",
                Style::default()
                    .fg(theme.highlight_fg)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" save  ", Style::default().fg(theme.comment)),
            Span::styled(
                "Esc",
                Style::default()
                    .fg(theme.highlight_fg)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" cancel", Style::default().fg(theme.comment)),
        ]);
        f.render_widget(Paragraph::new(hint), chunks[1]);
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
                let text = self.text();
                if text.is_empty() && !self.editing {
                    return WidgetResult::Close;
                }
                WidgetResult::Action(ContextAction::Apply(PendingEdit::SetComment {
                    address: self.address,
                    text,
                }))
            }
            _ => {
                self.textarea.input(key);
                WidgetResult::Handled
            }
        }
    }
}
