use crate::context_menu::ContextAction;
use crate::core::{Address, AnalysisCore, Xref, XrefKind};
use crate::state::AppState;
use crate::ui::widget::{Widget, WidgetResult};
use crate::ui_state::UIState;
use crate::window::ViewKind;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    widgets::{List, ListItem, ListState},
};

pub struct XRefsDialog {
    pub target_address: Address,
    pub display: String,
    pub references: Vec<Xref>,
    pub selected_index: usize,
    pub list_items: Vec<String>,
}

impl XRefsDialog {
    pub fn new(
        core: &dyn AnalysisCore,
        target_address: Address,
        display: String,
        mut refs: Vec<Xref>,
    ) -> Self {
        refs.sort_by_key(|x| x.from);
        refs.dedup_by_key(|x| x.from);

        let functions = core.functions();
        let list_items = if refs.is_empty() {
            vec!["No references found".to_string()]
        } else {
            refs.iter()
                .map(|xref| {
                    let kind = match xref.kind {
                        XrefKind::Call => "call",
                        XrefKind::Jump => "jump",
                        XrefKind::Data => "data",
                    };
                    let mut text = format!("{}  {:<4}", core.address_string(xref.from), kind);
                    let owner = functions
                        .iter()
                        .filter(|f| f.offset <= xref.from)
                        .max_by_key(|f| f.offset);
                    if let Some(function) = owner {
                        let delta = xref.from.saturating_sub(function.offset);
                        if delta == 0 {
                            text.push_str(&format!("  {}", function.name));
                        } else {
                            text.push_str(&format!("  {}+0x{:x}", function.name, delta));
                        }
                    }
                    text
                })
                .collect()
        };

        Self {
            target_address,
            display,
            references: refs,
            selected_index: 0,
            list_items,
        }
    }

    pub fn next(&mut self) {
        if !self.references.is_empty() {
            self.selected_index = (self.selected_index + 1) % self.references.len();
        }
    }

    pub fn previous(&mut self) {
        if !self.references.is_empty() {
            if self.selected_index == 0 {
                self.selected_index = self.references.len() - 1;
            } else {
                self.selected_index -= 1;
            }
        }
    }
}

impl Widget for XRefsDialog {
    fn render(&self, f: &mut Frame, area: Rect, _app_state: &AppState, ui_state: &mut UIState) {
        let theme = &ui_state.theme;
        let title = format!(" X-Refs for {} ", self.display);
        let block = crate::ui::widget::create_dialog_block(&title, theme);

        let area = crate::utils::centered_rect(60, 50, area);
        ui_state.active_dialog_area = area;
        f.render_widget(ratatui::widgets::Clear, area);

        let items: Vec<ListItem> = self
            .list_items
            .iter()
            .map(|t| ListItem::new(t.clone()))
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(
                Style::default()
                    .bg(theme.menu_selected_bg)
                    .fg(theme.menu_selected_fg)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol(">> ");

        let mut state = ListState::default();
        state.select(Some(self.selected_index));

        f.render_stateful_widget(list, area, &mut state);
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
            KeyCode::Down | KeyCode::Char('j') => {
                self.next();
                WidgetResult::Handled
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.previous();
                WidgetResult::Handled
            }
            KeyCode::Enter => match self.references.get(self.selected_index) {
                Some(xref) => WidgetResult::Action(ContextAction::ShowIn {
                    address: xref.from,
                    view: ViewKind::Decompiler,
                }),
                None => WidgetResult::Close,
            },
            _ => WidgetResult::Handled,
        }
    }
}
