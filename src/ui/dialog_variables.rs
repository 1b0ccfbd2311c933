use crate::context_menu::ContextAction;
use crate::core::{Address, VariableDescription};
use crate::edits::PendingEdit;
use crate::state::AppState;
use crate::ui::widget::{Widget, WidgetResult};
use crate::ui_state::UIState;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

/// Name and type editor for one local variable.
pub struct EditVariableDialog {
    function: Address,
    old_name: String,
    pub name: String,
    pub type_name: String,
    editing_type: bool,
}

impl EditVariableDialog {
    pub fn new(function: Address, variable: VariableDescription) -> Self {
        Self {
            function,
            old_name: variable.name.clone(),
            name: variable.name,
            type_name: variable.type_name,
            editing_type: false,
        }
    }

    fn focused(&mut self) -> &mut String {
        if self.editing_type {
            &mut self.type_name
        } else {
            &mut self.name
        }
    }
}

impl Widget for EditVariableDialog {
    fn render(&self, f: &mut Frame, area: Rect, _app_state: &AppState, ui_state: &mut UIState) {
        let theme = &ui_state.theme;
        let title = format!(" Edit variable {} ", self.old_name);
        let block = crate::ui::widget::create_dialog_block(&title, theme);

        let area = crate::utils::centered_rect_fixed(50, 6, area);
        ui_state.active_dialog_area = area;
        f.render_widget(ratatui::widgets::Clear, area);

        let field = |focused: bool| {
            let style = Style::default().fg(theme.highlight_fg);
            if focused {
                style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
            } else {
                style
            }
        };
        let label = Style::default().fg(theme.dialog_fg);
        let lines = vec![
            Line::from(vec![
                Span::styled("Name: ", label),
                Span::styled(self.name.clone(), field(!self.editing_type)),
            ]),
            Line::from(vec![
                Span::styled("Type: ", label),
                Span::styled(self.type_name.clone(), field(self.editing_type)),
            ]),
            Line::default(),
            Line::from(Span::styled(
                "Tab switch field  Enter save",
                Style::default().fg(theme.comment),
            )),
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
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.editing_type = !self.editing_type;
                WidgetResult::Handled
            }
            KeyCode::Enter => {
                let name = self.name.trim();
                let type_name = self.type_name.trim();
                if name.is_empty() || type_name.is_empty() {
                    ui_state.set_status_message("Variable name and type are required");
                    return WidgetResult::Handled;
                }
                WidgetResult::Action(ContextAction::Apply(PendingEdit::SetVariable {
                    function: self.function,
                    old_name: self.old_name.clone(),
                    variable: VariableDescription {
                        name: name.to_string(),
                        type_name: type_name.to_string(),
                    },
                }))
            }
            KeyCode::Backspace => {
                self.focused().pop();
                WidgetResult::Handled
            }
            KeyCode::Char('u') if key.modifiers == KeyModifiers::CONTROL => {
                self.focused().clear();
                WidgetResult::Handled
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.focused().push(c);
                WidgetResult::Handled
            }
            _ => WidgetResult::Handled,
        }
    }
}
