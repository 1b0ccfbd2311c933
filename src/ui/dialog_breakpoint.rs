use crate::context_menu::ContextAction;
use crate::core::{Address, Breakpoint, address_string};
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

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakpointField {
    Address,
    Condition,
    Enabled,
    Hardware,
}

impl BreakpointField {
    const ALL: [BreakpointField; 4] = [
        BreakpointField::Address,
        BreakpointField::Condition,
        BreakpointField::Enabled,
        BreakpointField::Hardware,
    ];

    fn next(self) -> Self {
        let i = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    fn previous(self) -> Self {
        let i = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Create or edit a breakpoint with its address, condition and flags.
pub struct BreakpointDialog {
    pub address_input: String,
    pub condition_input: String,
    pub enabled: bool,
    pub hardware: bool,
    pub focus: BreakpointField,
    /// Breakpoint being edited, `None` when creating.
    original: Option<Address>,
}

impl BreakpointDialog {
    pub fn create(address: Address) -> Self {
        Self {
            address_input: address_string(address),
            condition_input: String::new(),
            enabled: true,
            hardware: false,
            focus: BreakpointField::Condition,
            original: None,
        }
    }

    pub fn edit(breakpoint: &Breakpoint) -> Self {
        Self {
            address_input: address_string(breakpoint.address),
            condition_input: breakpoint.condition.clone().unwrap_or_default(),
            enabled: breakpoint.enabled,
            hardware: breakpoint.hardware,
            focus: BreakpointField::Condition,
            original: Some(breakpoint.address),
        }
    }

    fn focused_text(&mut self) -> Option<&mut String> {
        match self.focus {
            BreakpointField::Address => Some(&mut self.address_input),
            BreakpointField::Condition => Some(&mut self.condition_input),
            _ => None,
        }
    }

    fn confirm(&self, ui_state: &mut UIState) -> WidgetResult {
        let Some(address) = crate::utils::parse_address(&self.address_input) else {
            ui_state.set_status_message(format!("Invalid address '{}'", self.address_input));
            return WidgetResult::Handled;
        };
        let condition = self.condition_input.trim();
        let breakpoint = Breakpoint {
            address,
            enabled: self.enabled,
            hardware: self.hardware,
            condition: (!condition.is_empty()).then(|| condition.to_string()),
        };
        WidgetResult::Action(ContextAction::Apply(PendingEdit::SaveBreakpoint {
            breakpoint,
            replaces: self.original,
        }))
    }
}

impl Widget for BreakpointDialog {
    fn render(&self, f: &mut Frame, area: Rect, _app_state: &AppState, ui_state: &mut UIState) {
        let theme = &ui_state.theme;
        let title = if self.original.is_some() {
            " Edit Breakpoint "
        } else {
            " Add Breakpoint "
        };
        let block = crate::ui::widget::create_dialog_block(title, theme);

        let area = crate::utils::centered_rect_fixed(50, 7, area);
        ui_state.active_dialog_area = area;
        f.render_widget(ratatui::widgets::Clear, area);

        let label = Style::default().fg(theme.dialog_fg);
        let value = |focused: bool| {
            if focused {
                Style::default()
                    .fg(theme.menu_selected_fg)
                    .bg(theme.menu_selected_bg)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(theme.highlight_fg)
            }
        };
        let check = |on: bool| if on { "[x]" } else { "[ ]" };

        let lines = vec![
            Line::from(vec![
                Span::styled("Address:   ", label),
                Span::styled(
                    self.address_input.clone(),
                    value(self.focus == BreakpointField::Address),
                ),
            ]),
            Line::from(vec![
                Span::styled("Condition: ", label),
                Span::styled(
                    self.condition_input.clone(),
                    value(self.focus == BreakpointField::Condition),
                ),
            ]),
            Line::from(vec![
                Span::styled(
                    check(self.enabled),
                    value(self.focus == BreakpointField::Enabled),
                ),
                Span::styled(" Enabled  ", label),
                Span::styled(
                    check(self.hardware),
                    value(self.focus == BreakpointField::Hardware),
                ),
                Span::styled(" Hardware", label),
            ]),
            Line::default(),
            Line::from(Span::styled(
                "Tab next field  Space toggle  Enter save",
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
            KeyCode::Enter => self.confirm(ui_state),
            KeyCode::Tab | KeyCode::Down => {
                self.focus = self.focus.next();
                WidgetResult::Handled
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = self.focus.previous();
                WidgetResult::Handled
            }
            KeyCode::Char(' ') if self.focus == BreakpointField::Enabled => {
                self.enabled = !self.enabled;
                WidgetResult::Handled
            }
            KeyCode::Char(' ') if self.focus == BreakpointField::Hardware => {
                self.hardware = !self.hardware;
                WidgetResult::Handled
            }
            KeyCode::Backspace => {
                if let Some(text) = self.focused_text() {
                    text.pop();
                }
                WidgetResult::Handled
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                if let Some(text) = self.focused_text() {
                    text.push(c);
                }
                WidgetResult::Handled
            }
            _ => WidgetResult::Handled,
        }
    }
}
